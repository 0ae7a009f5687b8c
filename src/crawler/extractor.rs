//! Product record extraction
//!
//! Reads the three configured DOM locations of a product page. The selectors
//! are coupled to the target site's markup and live in configuration.

use crate::config::{FieldSelector, SelectorConfig};
use crate::output::{ProductRecord, RecordField};
use crate::{ConfigError, ConfigResult};
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors from record extraction; never fatal to the crawl
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Incomplete record at {url}: missing {}", join_fields(.missing))]
    IncompleteRecord {
        url: String,
        missing: Vec<RecordField>,
    },
}

fn join_fields(fields: &[RecordField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A compiled field selector
#[derive(Debug, Clone)]
struct CompiledField {
    selector: Selector,
    attribute: Option<String>,
}

impl CompiledField {
    fn compile(field: &str, config: &FieldSelector) -> ConfigResult<Self> {
        let selector = Selector::parse(&config.css).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} selector '{}': {:?}", field, config.css, e))
        })?;

        Ok(Self {
            selector,
            attribute: config.attribute.clone(),
        })
    }

    /// First matching element's attribute or text, trimmed; None if empty
    fn read(&self, document: &Html) -> Option<String> {
        let element = document.select(&self.selector).next()?;

        let value = match &self.attribute {
            Some(attribute) => element.value().attr(attribute)?.trim().to_string(),
            None => element
                .text()
                .collect::<String>()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        };

        (!value.is_empty()).then_some(value)
    }
}

/// Extracts product records using the configured selectors
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    item_name: CompiledField,
    price: CompiledField,
    image: CompiledField,
}

impl RecordExtractor {
    /// Compiles the selectors; an unparseable selector is a configuration error
    pub fn new(config: &SelectorConfig) -> ConfigResult<Self> {
        Ok(Self {
            item_name: CompiledField::compile("item-name", &config.item_name)?,
            price: CompiledField::compile("price", &config.price)?,
            image: CompiledField::compile("image", &config.image)?,
        })
    }

    /// Extracts a record from product page HTML
    ///
    /// `url` becomes the record's source URL and `captured_at` its capture
    /// time. Every missing or empty field is reported in the error.
    ///
    /// # Example
    ///
    /// ```
    /// use price_sweep::config::SelectorConfig;
    /// use price_sweep::crawler::RecordExtractor;
    /// use url::Url;
    ///
    /// let extractor = RecordExtractor::new(&SelectorConfig::default()).unwrap();
    /// let html = r#"
    ///     <div class="shirt-picture"><span><img src="img/shirts/shirt-101.jpg"></span></div>
    ///     <span class="price">$18</span>
    ///     <input type="hidden" name="item_name" value="Logo Shirt, Red">
    /// "#;
    /// let url = Url::parse("http://shirts4mike.com/shirt.php?id=101").unwrap();
    ///
    /// let record = extractor.extract(html, &url, "14:30").unwrap();
    /// assert_eq!(record.name, "Logo Shirt, Red");
    /// assert_eq!(record.price, "$18");
    /// ```
    pub fn extract(
        &self,
        html: &str,
        url: &Url,
        captured_at: &str,
    ) -> Result<ProductRecord, ExtractError> {
        let document = Html::parse_document(html);
        self.extract_document(&document, url, captured_at)
    }

    /// Same as [`RecordExtractor::extract`] for an already parsed document
    pub fn extract_document(
        &self,
        document: &Html,
        url: &Url,
        captured_at: &str,
    ) -> Result<ProductRecord, ExtractError> {
        let name = self.item_name.read(document);
        let price = self.price.read(document);
        let image_ref = self.image.read(document);
        let source_url = url.as_str().to_string();

        match (name, price, image_ref) {
            (Some(name), Some(price), Some(image_ref)) if !source_url.is_empty() => {
                Ok(ProductRecord {
                    name,
                    price,
                    image_ref,
                    source_url,
                    captured_at: captured_at.to_string(),
                })
            }
            (name, price, image_ref) => {
                let missing = [
                    (RecordField::Name, name.is_none()),
                    (RecordField::Price, price.is_none()),
                    (RecordField::ImageRef, image_ref.is_none()),
                    (RecordField::SourceUrl, source_url.is_empty()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();

                Err(ExtractError::IncompleteRecord {
                    url: source_url,
                    missing,
                })
            }
        }
    }
}
