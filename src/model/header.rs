use serde::Serialize;

/// A decoded FITS keyword value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Logical(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Empty,
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Integer(value) => Some(*value as f64),
            HeaderValue::Real(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Integer(value) => Some(*value),
            HeaderValue::Real(value) if value.fract() == 0.0 => Some(*value as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl std::fmt::Display for HeaderValue {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderValue::Logical(value) => write!(formatter, "{}", if *value { "T" } else { "F" }),
            HeaderValue::Integer(value) => write!(formatter, "{value}"),
            HeaderValue::Real(value) => write!(formatter, "{value}"),
            HeaderValue::Text(value) => write!(formatter, "'{value}'"),
            HeaderValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub keyword: String,
    pub value: HeaderValue,
    pub comment: Option<String>,
    /// False for records without a `= ` value indicator (`CONTINUE`,
    /// `HIERARCH`, ...). Their text after column 8 lives in `comment`.
    pub has_value: bool,
}

impl Card {
    pub fn new(keyword: impl Into<String>, value: HeaderValue) -> Self {
        Self {
            keyword: keyword.into().to_ascii_uppercase(),
            value,
            comment: None,
            has_value: true,
        }
    }

    /// A record whose columns 9-80 are free text, written back verbatim.
    pub fn commentary(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into().to_ascii_uppercase(),
            value: HeaderValue::Empty,
            comment: Some(text.into()),
            has_value: false,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// `COMMENT`, `HISTORY`, blank and indicator-less keywords may repeat and
    /// carry no value.
    pub fn is_commentary(&self) -> bool {
        !self.has_value || matches!(self.keyword.as_str(), "COMMENT" | "HISTORY" | "")
    }
}

/// Ordered FITS header. Lookups are by upper-case keyword; commentary cards
/// are kept in place but never matched by `get`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FitsHeader {
    cards: Vec<Card>,
}

impl FitsHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn get(&self, keyword: &str) -> Option<&HeaderValue> {
        let keyword = keyword.to_ascii_uppercase();
        self.cards
            .iter()
            .find(|card| !card.is_commentary() && card.keyword == keyword)
            .map(|card| &card.value)
    }

    pub fn get_f64(&self, keyword: &str) -> Option<f64> {
        self.get(keyword).and_then(HeaderValue::as_f64)
    }

    pub fn get_i64(&self, keyword: &str) -> Option<i64> {
        self.get(keyword).and_then(HeaderValue::as_i64)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.get(keyword).is_some()
    }

    /// Replaces the value of an existing keyword (keeping its comment) or
    /// appends a new card.
    pub fn set(&mut self, keyword: &str, value: HeaderValue) {
        let keyword = keyword.to_ascii_uppercase();
        match self
            .cards
            .iter_mut()
            .find(|card| !card.is_commentary() && card.keyword == keyword)
        {
            Some(card) => card.value = value,
            None => self.cards.push(Card::new(keyword, value)),
        }
    }

    pub fn push(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn remove(&mut self, keyword: &str) -> Option<HeaderValue> {
        let keyword = keyword.to_ascii_uppercase();
        let index = self
            .cards
            .iter()
            .position(|card| !card.is_commentary() && card.keyword == keyword)?;
        Some(self.cards.remove(index).value)
    }
}
