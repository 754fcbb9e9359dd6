/// vizugy.hu station page client (embedded-array variant).
///
/// The station page at
///   https://www.vizugy.hu/?AllomasVOA=<id>&mapData=Idosor&mapModule=OpGrafikon
/// renders its chart from inline JavaScript of the form
///
/// ```text
/// Vizallas = new Array(112, 113, 113, 114);
/// ```
///
/// The series is chronological, so the last element is the current level.
/// The argument list is tokenized here rather than evaluated: only numeric
/// literals (bare or quoted), commas and whitespace are accepted.

use crate::ingest::numeric::parse_centimeters;
use crate::model::{FetchError, StationQuery, WaterLevelReading};

// ---------------------------------------------------------------------------
// Request construction
// ---------------------------------------------------------------------------

pub const VIZUGY_BASE_URL: &str = "https://www.vizugy.hu/";

/// Station identifier of the Balaton average gauge.
pub const DEFAULT_STATION_ID: &str = "164961D7-97AB-11D4-BB62-00508BA24287";

const MARKER: &str = "Vizallas = new Array(";

/// Builds the station page query. The station id is passed through untouched.
pub fn build_station_query(endpoint: &str, station_id: &str) -> StationQuery {
    StationQuery::new(endpoint)
        .param("AllomasVOA", station_id)
        .param("mapData", "Idosor")
        .param("mapModule", "OpGrafikon")
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Returns the last element of the `Vizallas` array embedded in `page`.
///
/// # Errors
/// `FetchError::Parse` when the marker or its closing parenthesis is
/// missing, an element is not numeric, or the array is empty.
pub fn parse_station_page(page: &str) -> Result<WaterLevelReading, FetchError> {
    let levels = extract_levels(page)?;
    levels
        .last()
        .copied()
        .map(WaterLevelReading)
        .ok_or_else(|| FetchError::parse("Vizallas array is empty"))
}

/// Extracts the whole `Vizallas` series in page order.
pub fn extract_levels(page: &str) -> Result<Vec<i64>, FetchError> {
    let start = page
        .find(MARKER)
        .ok_or_else(|| FetchError::parse("'Vizallas = new Array(' not found in page"))?
        + MARKER.len();

    let rest = &page[start..];
    let end = rest
        .find(')')
        .ok_or_else(|| FetchError::parse("Vizallas array is not closed"))?;

    parse_array_arguments(&rest[..end])
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Literal(&'a str),
    Comma,
}

/// Splits the argument text into literals and commas.
fn tokenize(args: &str) -> Result<Vec<Token<'_>>, FetchError> {
    let mut tokens = Vec::new();
    let mut chars = args.char_indices().peekable();

    while let Some(&(i, c)) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '\'' | '"' => {
                chars.next();
                let body_start = i + c.len_utf8();
                let mut body_end = None;
                for (j, d) in chars.by_ref() {
                    if d == c {
                        body_end = Some(j);
                        break;
                    }
                }
                let body_end = body_end.ok_or_else(|| {
                    FetchError::parse(format!("unterminated string at offset {}", i))
                })?;
                tokens.push(Token::Literal(&args[body_start..body_end]));
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => {
                let mut end = i;
                while let Some(&(j, d)) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' || ((d == '-' || d == '+') && j == i) {
                        end = j + d.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Literal(&args[i..end]));
            }
            other => {
                return Err(FetchError::parse(format!(
                    "unexpected character '{}' in Vizallas array at offset {}",
                    other, i
                )));
            }
        }
    }

    Ok(tokens)
}

/// `literal (',' literal)* ','?` or nothing at all.
fn parse_array_arguments(args: &str) -> Result<Vec<i64>, FetchError> {
    let tokens = tokenize(args)?;
    let mut values = Vec::new();
    let mut expect_literal = true;

    for token in tokens {
        match (token, expect_literal) {
            (Token::Literal(text), true) => {
                values.push(parse_centimeters(text)?);
                expect_literal = false;
            }
            (Token::Comma, false) => expect_literal = true,
            (Token::Literal(text), false) => {
                return Err(FetchError::parse(format!("missing comma before '{}'", text)));
            }
            (Token::Comma, true) => {
                return Err(FetchError::parse("empty element in Vizallas array"));
            }
        }
    }

    Ok(values)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
