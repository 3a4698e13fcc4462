//! XML sales feed parser.
//!
//! Event-driven parsing of one feed document into deduplicated, validated
//! [`SaleRecord`]s. Document-level problems (unparsable markup, bad root
//! date) abort the feed; per-node problems are logged at warn level and the
//! node is skipped.

use std::collections::HashMap;

use chrono::NaiveDate;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader as XmlReader;
use tracing::{debug, warn};

use super::error::{FeedError, ParseResult};
use crate::domain::{
    CategoryName, Price, ProductName, Quantity, SaleRecord, DEFAULT_CATEGORY,
};

/// Default selector for the repeating product node.
pub const DEFAULT_PRODUCT_SELECTOR: &str = "//product";

const DATE_ATTR: &str = "date";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result of parsing one feed document.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    /// Feed-wide sale date from the root `date` attribute.
    pub sale_date: NaiveDate,
    /// Aggregated records, one per distinct product name, in first-seen order.
    pub records: Vec<SaleRecord>,
}

/// Which child of the current product node is being captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Quantity,
    Price,
    Category,
}

/// Raw text fields of one product node before validation. Only the first
/// occurrence of each child is kept, mirroring a `findtext` lookup.
#[derive(Debug, Default)]
struct RawProductNode {
    name: Option<String>,
    quantity: Option<String>,
    price: Option<String>,
    category: Option<String>,
}

impl RawProductNode {
    fn set(&mut self, field: Field, text: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Quantity => &mut self.quantity,
            Field::Price => &mut self.price,
            Field::Category => &mut self.category,
        };
        if slot.is_none() {
            *slot = Some(text);
        }
    }
}

/// Synchronous, side-effect-free XML feed parser.
pub struct FeedParser;

impl FeedParser {
    /// Parses one feed document into deduplicated sale records.
    ///
    /// `selector` is an XPath-like expression whose trailing element name
    /// identifies the repeating product node (`"//product"` matches every
    /// `<product>` element at any depth).
    ///
    /// # Errors
    /// [`FeedError::MalformedInput`] when the document does not parse;
    /// [`FeedError::InvalidDateFormat`] when the root `date` attribute is
    /// missing or not `YYYY-MM-DD`. Either error aborts the whole feed.
    pub fn parse(feed_text: &str, selector: &str) -> ParseResult<ParsedFeed> {
        let target = element_name(selector);
        debug!(target_element = target, "starting feed parse");

        let mut reader = XmlReader::from_str(feed_text);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut depth: usize = 0;
        let mut sale_date: Option<NaiveDate> = None;
        let mut current: Option<RawProductNode> = None;
        let mut product_depth: usize = 0;
        let mut capture: Option<Field> = None;

        let mut records: Vec<SaleRecord> = Vec::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    if sale_date.is_none() {
                        sale_date = Some(read_sale_date(e)?);
                    } else if current.is_none() && e.local_name().as_ref() == target.as_bytes() {
                        current = Some(RawProductNode::default());
                        product_depth = depth + 1;
                        capture = None;
                    } else if current.is_some() && depth == product_depth {
                        capture = field_for(e.local_name().as_ref());
                    }
                    depth += 1;
                }
                Ok(Event::Empty(ref e)) => {
                    if sale_date.is_none() {
                        // Self-closing root: a valid date but zero nodes.
                        sale_date = Some(read_sale_date(e)?);
                    } else if current.is_none() && e.local_name().as_ref() == target.as_bytes() {
                        warn!("skipping empty product node with no child fields");
                    }
                }
                Ok(Event::Text(ref t)) => {
                    if depth == 0 {
                        return Err(FeedError::malformed("text outside of root element"));
                    }
                    if let (Some(node), Some(field)) = (current.as_mut(), capture) {
                        let text = t.unescape().map_err(FeedError::malformed)?;
                        node.set(field, text.into_owned());
                    }
                }
                Ok(Event::CData(ref t)) => {
                    if depth == 0 {
                        return Err(FeedError::malformed("text outside of root element"));
                    }
                    if let (Some(node), Some(field)) = (current.as_mut(), capture) {
                        let text = String::from_utf8_lossy(t).into_owned();
                        node.set(field, text);
                    }
                }
                Ok(Event::End(_)) => {
                    if depth == 0 {
                        return Err(FeedError::malformed("unexpected closing tag"));
                    }
                    depth -= 1;
                    capture = None;
                    if current.is_some() && depth + 1 == product_depth {
                        let node = current.take().unwrap_or_default();
                        // Root date is always present once a node closes.
                        let date = sale_date.ok_or_else(|| {
                            FeedError::malformed("product node outside feed root")
                        })?;
                        collect_node(node, date, &mut records, &mut by_name);
                    }
                }
                Ok(Event::Eof) => {
                    if depth != 0 {
                        return Err(FeedError::malformed("unexpected end of document"));
                    }
                    break;
                }
                Ok(_) => {}
                Err(e) => return Err(FeedError::malformed(e)),
            }
            buf.clear();
        }

        // A root element without a date attribute fails at its start event, so
        // reaching Eof with no date means the document had no root element.
        let sale_date = sale_date.ok_or_else(|| FeedError::malformed("no root element found"))?;
        debug!(
            records = records.len(),
            %sale_date,
            "feed parse complete"
        );
        Ok(ParsedFeed { sale_date, records })
    }
}

/// Extracts the repeating-element name from an XPath-like selector.
fn element_name(selector: &str) -> &str {
    let name = selector.rsplit('/').next().unwrap_or(selector).trim();
    if name.is_empty() {
        "product"
    } else {
        name
    }
}

fn field_for(local_name: &[u8]) -> Option<Field> {
    match local_name {
        b"name" => Some(Field::Name),
        b"quantity" => Some(Field::Quantity),
        b"price" => Some(Field::Price),
        b"category" => Some(Field::Category),
        _ => None,
    }
}

fn read_sale_date(root: &BytesStart<'_>) -> ParseResult<NaiveDate> {
    for attr in root.attributes() {
        let attr = attr.map_err(FeedError::malformed)?;
        if attr.key.as_ref() == DATE_ATTR.as_bytes() {
            let raw = attr
                .unescape_value()
                .map_err(FeedError::malformed)?
                .into_owned();
            return NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                .map_err(|_| FeedError::InvalidDateFormat { value: Some(raw) });
        }
    }
    Err(FeedError::InvalidDateFormat { value: None })
}

/// Validates one raw node and folds it into the aggregate. Per-node policy
/// is skip-and-continue: anything invalid here drops the node with a warning
/// and parsing moves on.
fn collect_node(
    node: RawProductNode,
    sale_date: NaiveDate,
    records: &mut Vec<SaleRecord>,
    by_name: &mut HashMap<String, usize>,
) {
    let Some(name) = node.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        warn!("skipping product node: missing name");
        return;
    };
    let Some(quantity_text) = node.quantity.as_deref() else {
        warn!(product = name, "skipping product node: missing quantity");
        return;
    };
    let Some(price_text) = node.price.as_deref() else {
        warn!(product = name, "skipping product node: missing price");
        return;
    };

    let Ok(quantity_raw) = quantity_text.trim().parse::<i64>() else {
        warn!(
            product = name,
            quantity = quantity_text,
            "skipping product node: quantity is not an integer"
        );
        return;
    };
    let quantity = match Quantity::new(quantity_raw) {
        Ok(q) => q,
        Err(e) => {
            warn!(product = name, error = %e, "skipping product node");
            return;
        }
    };

    let price_major = match price_text.trim().parse::<f64>() {
        Ok(p) if p.is_finite() => p,
        _ => {
            warn!(
                product = name,
                price = price_text,
                "skipping product node: price is not numeric"
            );
            return;
        }
    };
    let price = match Price::from_major_units(price_major) {
        Ok(p) => p,
        Err(e) => {
            warn!(product = name, error = %e, "skipping product node");
            return;
        }
    };

    if let Some(&idx) = by_name.get(name) {
        records[idx].absorb(quantity);
        debug!(
            product = name,
            quantity = records[idx].quantity.get(),
            "aggregated repeated product"
        );
        return;
    }

    let product = match ProductName::new(name) {
        Ok(p) => p,
        Err(e) => {
            warn!(product = name, error = %e, "skipping product node");
            return;
        }
    };
    let category = node
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY);

    by_name.insert(name.to_string(), records.len());
    records.push(SaleRecord {
        product,
        quantity,
        price,
        category_name: CategoryName::new(category),
        sale_date,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<sales date="2024-01-01">
        <products>
            <product>
                <name>A</name>
                <quantity>3</quantity>
                <price>10.00</price>
                <category>X</category>
            </product>
            <product>
                <name>A</name>
                <quantity>2</quantity>
                <price>10.00</price>
                <category>X</category>
            </product>
        </products>
    </sales>"#;

    #[test]
    fn aggregates_repeated_product_names() {
        let feed = FeedParser::parse(FEED, DEFAULT_PRODUCT_SELECTOR).unwrap();
        assert_eq!(feed.sale_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(feed.records.len(), 1);
        let record = &feed.records[0];
        assert_eq!(record.product.as_str(), "A");
        assert_eq!(record.quantity.get(), 5);
        assert_eq!(record.price.get(), 1000);
        assert_eq!(record.category_name.as_str(), "X");
    }

    #[test]
    fn first_occurrence_price_and_category_win() {
        let xml = r#"<sales date="2024-05-05">
            <product><name>A</name><quantity>1</quantity><price>1.00</price><category>X</category></product>
            <product><name>A</name><quantity>1</quantity><price>9.99</price><category>Y</category></product>
        </sales>"#;
        let feed = FeedParser::parse(xml, "//product").unwrap();
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].price.get(), 100);
        assert_eq!(feed.records[0].category_name.as_str(), "X");
        assert_eq!(feed.records[0].quantity.get(), 2);
    }

    #[test]
    fn missing_category_defaults_to_unknown() {
        let xml = r#"<sales date="2024-01-02">
            <product><name>B</name><quantity>1</quantity><price>2.50</price></product>
        </sales>"#;
        let feed = FeedParser::parse(xml, "//product").unwrap();
        assert_eq!(feed.records[0].category_name.as_str(), "Unknown");
        assert_eq!(feed.records[0].price.get(), 250);
    }

    #[test]
    fn fractional_cents_truncate() {
        let xml = r#"<sales date="2024-01-02">
            <product><name>B</name><quantity>1</quantity><price>12.345</price></product>
        </sales>"#;
        let feed = FeedParser::parse(xml, "//product").unwrap();
        assert_eq!(feed.records[0].price.get(), 1234);
    }

    #[test]
    fn node_missing_price_is_skipped_not_fatal() {
        let xml = r#"<sales date="2024-01-03">
            <product><name>Good</name><quantity>1</quantity><price>1.00</price></product>
            <product><name>Bad</name><quantity>1</quantity></product>
        </sales>"#;
        let feed = FeedParser::parse(xml, "//product").unwrap();
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].product.as_str(), "Good");
    }

    #[test]
    fn non_integer_quantity_and_non_numeric_price_are_skipped() {
        let xml = r#"<sales date="2024-01-03">
            <product><name>A</name><quantity>two</quantity><price>1.00</price></product>
            <product><name>B</name><quantity>2</quantity><price>cheap</price></product>
            <product><name>C</name><quantity>2</quantity><price>nan</price></product>
            <product><name>D</name><quantity>4</quantity><price>4.00</price></product>
        </sales>"#;
        let feed = FeedParser::parse(xml, "//product").unwrap();
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].product.as_str(), "D");
    }

    #[test]
    fn negative_quantity_is_skipped() {
        let xml = r#"<sales date="2024-01-03">
            <product><name>A</name><quantity>-2</quantity><price>1.00</price></product>
        </sales>"#;
        let feed = FeedParser::parse(xml, "//product").unwrap();
        assert!(feed.records.is_empty());
    }

    #[test]
    fn missing_date_attribute_is_fatal() {
        let xml = r#"<sales><product><name>A</name><quantity>1</quantity><price>1.0</price></product></sales>"#;
        let err = FeedParser::parse(xml, "//product").unwrap_err();
        assert_eq!(err, FeedError::InvalidDateFormat { value: None });
    }

    #[test]
    fn bad_date_format_is_fatal() {
        let xml = r#"<sales date="01-01-2024"></sales>"#;
        let err = FeedParser::parse(xml, "//product").unwrap_err();
        assert!(matches!(err, FeedError::InvalidDateFormat { value: Some(v) } if v == "01-01-2024"));
    }

    #[test]
    fn malformed_markup_is_fatal_even_with_valid_nodes_after() {
        let xml = r#"<sales date="2024-01-01">
            <product><name>A</name>
            <product><name>B</name><quantity>1</quantity><price>1.0</price></product>
        </sales>"#;
        let err = FeedParser::parse(xml, "//product").unwrap_err();
        assert!(matches!(err, FeedError::MalformedInput { .. }));
    }

    #[test]
    fn unclosed_document_is_malformed() {
        let xml = r#"<sales date="2024-01-01"><products>"#;
        let err = FeedParser::parse(xml, "//product").unwrap_err();
        assert!(matches!(err, FeedError::MalformedInput { .. }));
    }

    #[test]
    fn empty_feed_parses_to_zero_records() {
        let feed = FeedParser::parse(r#"<sales date="2024-02-02"></sales>"#, "//product").unwrap();
        assert!(feed.records.is_empty());
        let feed = FeedParser::parse(r#"<sales date="2024-02-02"/>"#, "//product").unwrap();
        assert!(feed.records.is_empty());
    }

    #[test]
    fn input_without_a_root_element_is_malformed() {
        let err = FeedParser::parse("", "//product").unwrap_err();
        assert!(matches!(err, FeedError::MalformedInput { .. }));
        let err = FeedParser::parse("hello world", "//product").unwrap_err();
        assert!(matches!(err, FeedError::MalformedInput { .. }));
    }

    #[test]
    fn text_around_the_root_element_is_malformed() {
        let err = FeedParser::parse(r#"junk<sales date="2024-01-01"/>"#, "//product").unwrap_err();
        assert!(matches!(err, FeedError::MalformedInput { .. }));
        let err =
            FeedParser::parse(r#"<sales date="2024-01-01"/>trailing"#, "//product").unwrap_err();
        assert!(matches!(err, FeedError::MalformedInput { .. }));
    }

    #[test]
    fn selector_trailing_element_name_is_used() {
        let xml = r#"<sales date="2024-01-01">
            <item><name>A</name><quantity>1</quantity><price>1.00</price></item>
        </sales>"#;
        let feed = FeedParser::parse(xml, "//sales/item").unwrap();
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].product.as_str(), "A");
    }
}
