use serde::{Deserialize, Deserializer, Serialize};

/// Wildcard selecting every serial port on the appliance.
pub const ALL_PORTS: &str = "*";

/// Serial ports whose connection status is requested.
///
/// Entries are kept exactly as given: no numeric validation, no
/// deduplication, original order. The default selects all ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PortSelector(Vec<String>);

impl PortSelector {
    pub fn all() -> Self {
        Self(vec![ALL_PORTS.to_string()])
    }

    pub fn new<I, S>(ports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(ports.into_iter().map(Into::into).collect())
    }

    /// Splits a comma separated list such as `"2,4"` without trimming.
    pub fn parse(value: &str) -> Self {
        Self::new(value.split(','))
    }

    pub fn ports(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.0.len() == 1 && self.0[0] == ALL_PORTS
    }

    /// Value of the `ports` query parameter.
    pub fn query_value(&self) -> String {
        self.0.join(",")
    }
}

impl Default for PortSelector {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortItem {
    Text(String),
    Number(serde_json::Number),
}

impl PortItem {
    fn into_string(self) -> String {
        match self {
            PortItem::Text(s) => s,
            PortItem::Number(n) => n.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPorts {
    List(Vec<PortItem>),
    One(PortItem),
}

// Accepts the shapes an automation host produces for a list of strings:
// a list of strings or numbers, a bare number, or a comma separated string.
impl<'de> Deserialize<'de> for PortSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPorts::deserialize(deserializer)? {
            RawPorts::List(items) => Self::new(items.into_iter().map(PortItem::into_string)),
            RawPorts::One(PortItem::Text(s)) => Self::parse(&s),
            RawPorts::One(item) => Self::new([item.into_string()]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_is_wildcard() {
        let ports = PortSelector::default();
        assert!(ports.is_all());
        assert_eq!(ports.query_value(), "*");
    }

    #[test]
    fn test_query_value_preserves_order_and_duplicates() {
        let ports = PortSelector::new(["4", "2", "4"]);
        assert_eq!(ports.query_value(), "4,2,4");
        assert!(!ports.is_all());
    }

    #[test]
    fn test_deserialize_shapes() {
        let from_list: PortSelector = serde_json::from_value(json!(["2", "4"])).unwrap();
        assert_eq!(from_list.ports(), ["2", "4"]);

        let mixed: PortSelector = serde_json::from_value(json!([2, "console"])).unwrap();
        assert_eq!(mixed.query_value(), "2,console");

        let number: PortSelector = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(number.ports(), ["2"]);

        let csv: PortSelector = serde_json::from_value(json!("2,4")).unwrap();
        assert_eq!(csv.ports(), ["2", "4"]);

        let star: PortSelector = serde_json::from_value(json!("*")).unwrap();
        assert!(star.is_all());
    }

    #[test]
    fn test_parse_does_not_trim() {
        let ports = PortSelector::parse("2, 4");
        assert_eq!(ports.ports(), ["2", " 4"]);
    }
}
