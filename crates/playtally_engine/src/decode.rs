use playtally_core::{PageResult, PlayRecord};
use roxmltree::{Document, Node};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("response is not well-formed XML: {0}")]
    Xml(String),
    #[error("response has no <plays> root element")]
    MissingRoot,
    #[error("attribute {name} is missing or invalid: {value:?}")]
    InvalidAttribute { name: &'static str, value: Option<String> },
}

/// Decodes one page of the plays endpoint into the records the aggregator needs.
///
/// Expected shape:
/// `<plays total="N"><play quantity="Q"><players><player/>...</players></play>...</plays>`.
/// A play's player count is the number of `player` children of its own
/// `players` element; a play without one counts zero players.
pub fn decode_plays_page(body: &str) -> Result<PageResult, DecodeError> {
    let doc = Document::parse(body).map_err(|err| DecodeError::Xml(err.to_string()))?;
    let root = doc
        .descendants()
        .find(|node| node.has_tag_name("plays"))
        .ok_or(DecodeError::MissingRoot)?;
    let total_remaining = parse_attr::<i64>(root, "total")?;

    let records = child_elements(root, "play")
        .map(|play| -> Result<PlayRecord, DecodeError> {
            let quantity = parse_attr::<u64>(play, "quantity")?;
            let player_count = child_elements(play, "players")
                .next()
                .map_or(0, |players| child_elements(players, "player").count())
                as u32;
            Ok(PlayRecord {
                quantity,
                player_count,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PageResult {
        total_remaining,
        records,
    })
}

fn child_elements<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |child| child.has_tag_name(name))
}

fn parse_attr<T: std::str::FromStr>(
    node: Node<'_, '_>,
    name: &'static str,
) -> Result<T, DecodeError> {
    let raw = node.attribute(name);
    raw.and_then(|value| value.trim().parse::<T>().ok())
        .ok_or_else(|| DecodeError::InvalidAttribute {
            name,
            value: raw.map(str::to_string),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<plays username="" userid="0" total="3" page="1">
  <play id="1" date="2024-01-01" quantity="2" length="0" incomplete="0" location="">
    <item name="Catan" objecttype="thing" objectid="13">
      <subtypes><subtype value="boardgame" /></subtypes>
    </item>
    <players>
      <player username="a" name="A" score="" win="1" />
      <player username="b" name="B" score="" win="0" />
      <player username="c" name="C" score="" win="0" />
    </players>
  </play>
  <play id="2" date="2024-01-02" quantity="1" length="0" incomplete="0" location="">
    <item name="Catan" objecttype="thing" objectid="13">
      <subtypes><subtype value="boardgame" /></subtypes>
    </item>
  </play>
</plays>"#;

    #[test]
    fn counts_players_and_reads_quantity() {
        let page = decode_plays_page(PAGE).unwrap();
        assert_eq!(page.total_remaining, 3);
        assert_eq!(
            page.records,
            vec![
                PlayRecord {
                    quantity: 2,
                    player_count: 3
                },
                PlayRecord {
                    quantity: 1,
                    player_count: 0
                },
            ]
        );
    }

    #[test]
    fn empty_page_has_total_and_no_records() {
        let page = decode_plays_page(r#"<plays total="0" page="1"></plays>"#).unwrap();
        assert_eq!(page.total_remaining, 0);
        assert!(page.records.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = decode_plays_page("<html><body>Rate limit exceeded</body></html>").unwrap_err();
        assert_eq!(err, DecodeError::MissingRoot);
    }

    #[test]
    fn bad_quantity_is_an_error() {
        let err =
            decode_plays_page(r#"<plays total="1"><play quantity="x"></play></plays>"#).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidAttribute {
                name: "quantity",
                value: Some("x".to_string())
            }
        );
    }

    #[test]
    fn self_closing_play_does_not_borrow_later_players() {
        let body = r#"<plays total="2"><play id="1" quantity="1"/><play id="2" quantity="5"><players><player name="a"/><player name="b"/></players></play></plays>"#;
        let page = decode_plays_page(body).unwrap();
        assert_eq!(
            page.records,
            vec![
                PlayRecord {
                    quantity: 1,
                    player_count: 0
                },
                PlayRecord {
                    quantity: 5,
                    player_count: 2
                },
            ]
        );
    }

    #[test]
    fn only_direct_players_of_the_play_are_counted() {
        let body = r#"<plays total="1"><play quantity="1"><item><players><player/></players></item><players><player/><player/></players></play></plays>"#;
        let page = decode_plays_page(body).unwrap();
        assert_eq!(page.records[0].player_count, 2);
    }

    #[test]
    fn html_error_page_is_not_xml() {
        let err = decode_plays_page("<html><body><br>Rate limit</body></html>").unwrap_err();
        assert!(matches!(err, DecodeError::Xml(_)));
    }

    #[test]
    fn missing_total_is_an_error() {
        let err = decode_plays_page("<plays></plays>").unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidAttribute {
                name: "total",
                value: None
            }
        );
    }
}
