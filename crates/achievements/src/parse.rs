//! Stateless HTML-to-record transforms for the two achievement sources.
//!
//! Each parser takes one fetched document and yields records in the
//! document's display order. Missing top-level structure is a
//! [`ParseError`]; a present container with zero rows is an empty
//! sequence.

use scraper::{ElementRef, Html, Selector};

use crate::error::ParseError;
use crate::types::Achievement;

/// Heading label that anchors the SteamDB achievements table.
const STEAMDB_SECTION_LABEL: &str = "Achievements";

/// Marker token SteamDB places in the description of hidden achievements.
const HIDDEN_MARKER: &str = "Hidden";

/// Parses the SteamDB stats page (source A).
///
/// Locates the `Achievements` heading, then the next sibling
/// `table.table`; each body row yields one achievement. Rows carrying
/// the hidden marker get `hidden = true` and a blanked description.
/// Icon filenames come from the `data-name` attributes of the row's
/// images; the locked icon falls back to the unlocked one when the row
/// has a single image.
pub fn parse_steamdb(html: &str) -> Result<Vec<Achievement>, ParseError> {
    let document = Html::parse_document(html);

    let heading = document
        .select(&selector("h2"))
        .find(|h| text_of(*h) == STEAMDB_SECTION_LABEL)
        .ok_or(ParseError::MissingSection)?;

    let table = heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table" && has_class(*el, "table"))
        .ok_or(ParseError::MissingTable)?;

    let row_sel = selector("tbody tr");
    let td_sel = selector("td");
    let desc_sel = selector("p.i");
    let img_sel = selector("img");

    let mut achievements = Vec::new();
    for (index, row) in table.select(&row_sel).enumerate() {
        let tds: Vec<ElementRef> = row.select(&td_sel).collect();

        let name = tds
            .first()
            .map(|td| text_of(*td))
            .filter(|n| !n.is_empty())
            .ok_or(ParseError::MalformedRow { index })?;

        let display_name = tds.get(1).and_then(first_text_child).unwrap_or_default();
        let description = tds
            .get(1)
            .and_then(|td| td.select(&desc_sel).next())
            .map(text_of)
            .unwrap_or_default();
        let (hidden, description) = if description.contains(HIDDEN_MARKER) {
            (true, String::new())
        } else {
            (false, description)
        };

        let icons: Vec<&str> = tds
            .get(2)
            .map(|td| {
                td.select(&img_sel)
                    .filter_map(|img| img.value().attr("data-name"))
                    .collect()
            })
            .unwrap_or_default();
        let icon = icons.first().copied().unwrap_or("");
        let icongray = icons.get(1).copied().unwrap_or(icon);

        achievements.push(Achievement {
            description,
            display_name,
            hidden,
            icon: image_path(icon),
            icongray: image_path(icongray),
            name,
        });
    }

    Ok(achievements)
}

/// Parses the Steam Community achievements page (source B).
///
/// Each `.achieveRow` yields one achievement named by its 1-based
/// ordinal, since the page exposes no stable identifier. The single
/// available image serves as both icon states, and an empty description
/// marks the achievement as hidden.
pub fn parse_steamcommunity(html: &str) -> Result<Vec<Achievement>, ParseError> {
    let document = Html::parse_document(html);

    let row_sel = selector(".achieveRow");
    let img_sel = selector(".achieveImgHolder img");
    let title_sel = selector(".achieveTxt h3");
    let desc_sel = selector(".achieveTxt h5");

    let mut achievements = Vec::new();
    for (index, row) in document.select(&row_sel).enumerate() {
        let icon_src = row
            .select(&img_sel)
            .next()
            .and_then(|img| img.value().attr("src"))
            .ok_or(ParseError::MalformedRow { index })?;
        let display_name = row
            .select(&title_sel)
            .next()
            .map(text_of)
            .ok_or(ParseError::MalformedRow { index })?;
        let description = row.select(&desc_sel).next().map(text_of).unwrap_or_default();

        let icon = image_path(icon_src);
        achievements.push(Achievement {
            hidden: description.is_empty(),
            description,
            display_name,
            icongray: icon.clone(),
            icon,
            name: format!("ach{}", index + 1),
        });
    }

    Ok(achievements)
}

/// Normalizes an icon reference to `images/<basename>` regardless of
/// the source's absolute or relative form.
fn image_path(reference: &str) -> String {
    format!("images/{}", basename(reference))
}

/// Returns the final path segment, treating both separator styles as
/// separators so untrusted markup cannot smuggle one through.
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn text_of(el: ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn has_class(el: ElementRef, class: &str) -> bool {
    el.value()
        .attr("class")
        .is_some_and(|attr| attr.split_whitespace().any(|c| c == class))
}

/// First non-empty direct text child, i.e. the display name in
/// SteamDB's second column (the description lives in a nested `p.i`).
fn first_text_child(td: &ElementRef) -> Option<String> {
    td.children()
        .filter_map(|node| node.value().as_text())
        .map(|t| t.trim())
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEAMDB_PAGE: &str = r#"
        <html><body>
        <h2>Some other section</h2>
        <h2>Achievements</h2>
        <table class="table">
          <tbody>
            <tr>
              <td>ACH_WIN</td>
              <td>Winner<p class="i">Win a game</p></td>
              <td><img data-name="win.jpg"><img data-name="win_gray.jpg"></td>
            </tr>
            <tr>
              <td>ACH_SECRET</td>
              <td>Secret<p class="i">Hidden.</p></td>
              <td><img data-name="secret.jpg"></td>
            </tr>
          </tbody>
        </table>
        </body></html>"#;

    fn community_page(rows: usize) -> String {
        let mut body = String::from("<html><body><div id='mainContents'>");
        for i in 1..=rows {
            body.push_str(&format!(
                "<div class='achieveRow'>\
                   <div class='achieveImgHolder'><img src='https://cdn.example/apps/10/icon{i}.jpg'></div>\
                   <div class='achieveTxt'><h3>Achievement {i}</h3><h5>Do thing {i}</h5></div>\
                 </div>"
            ));
        }
        body.push_str("</div></body></html>");
        body
    }

    #[test]
    fn steamdb_parses_rows_in_order() {
        let list = parse_steamdb(STEAMDB_PAGE).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "ACH_WIN");
        assert_eq!(list[0].display_name, "Winner");
        assert_eq!(list[0].description, "Win a game");
        assert!(!list[0].hidden);
        assert_eq!(list[0].icon, "images/win.jpg");
        assert_eq!(list[0].icongray, "images/win_gray.jpg");
    }

    #[test]
    fn steamdb_hidden_marker_blanks_description() {
        let list = parse_steamdb(STEAMDB_PAGE).unwrap();
        assert!(list[1].hidden);
        assert_eq!(list[1].description, "");
    }

    #[test]
    fn steamdb_single_icon_serves_both_states() {
        let list = parse_steamdb(STEAMDB_PAGE).unwrap();
        assert_eq!(list[1].icon, "images/secret.jpg");
        assert_eq!(list[1].icongray, "images/secret.jpg");
    }

    #[test]
    fn steamdb_names_unique_and_non_empty() {
        let list = parse_steamdb(STEAMDB_PAGE).unwrap();
        let mut names: Vec<&str> = list.iter().map(|a| a.name.as_str()).collect();
        assert!(names.iter().all(|n| !n.is_empty()));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), list.len());
    }

    #[test]
    fn steamdb_missing_section_is_error() {
        let err = parse_steamdb("<html><body><h2>Stats</h2></body></html>").unwrap_err();
        assert!(matches!(err, ParseError::MissingSection));
    }

    #[test]
    fn steamdb_missing_table_is_error() {
        let err = parse_steamdb("<html><body><h2>Achievements</h2><p>soon</p></body></html>")
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingTable));
    }

    #[test]
    fn steamdb_empty_table_yields_empty_sequence() {
        let html = r#"<html><body><h2>Achievements</h2>
            <table class="table"><tbody></tbody></table></body></html>"#;
        assert!(parse_steamdb(html).unwrap().is_empty());
    }

    #[test]
    fn community_parses_ordinal_names_in_document_order() {
        let list = parse_steamcommunity(&community_page(3)).unwrap();
        let names: Vec<&str> = list.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["ach1", "ach2", "ach3"]);
        assert_eq!(list[0].display_name, "Achievement 1");
        assert_eq!(list[2].icon, "images/icon3.jpg");
    }

    #[test]
    fn community_single_image_used_for_both_states() {
        let list = parse_steamcommunity(&community_page(1)).unwrap();
        assert_eq!(list[0].icon, list[0].icongray);
    }

    #[test]
    fn community_empty_description_means_hidden() {
        let html = "<html><body>\
            <div class='achieveRow'>\
              <div class='achieveImgHolder'><img src='x/spoiler.jpg'></div>\
              <div class='achieveTxt'><h3>Spoiler</h3><h5></h5></div>\
            </div></body></html>";
        let list = parse_steamcommunity(html).unwrap();
        assert!(list[0].hidden);
        assert_eq!(list[0].description, "");
    }

    #[test]
    fn community_zero_rows_yields_empty_sequence() {
        let list = parse_steamcommunity("<html><body><div id='m'></div></body></html>").unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn basename_strips_any_prefix() {
        assert_eq!(basename("https://cdn.example/a/b/icon.jpg"), "icon.jpg");
        assert_eq!(basename("icon.jpg"), "icon.jpg");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn basename_strips_backslash_prefixes() {
        assert_eq!(basename(r"..\evil.dll"), "evil.dll");
        assert_eq!(basename(r"a\b/icon.jpg"), "icon.jpg");
    }
}
