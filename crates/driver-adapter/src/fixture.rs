//! Deterministic in-process driver used by tests and the demo CLI
//!
//! [`FixtureDriver`] holds a flat element list standing in for a page.
//! Locator strategies are evaluated against element attributes with the
//! same semantics a real driver implementation must provide; CSS and
//! XPath support the decidable subset those strategies are documented
//! with. Element handles are document-order indexes and go stale when
//! the page is swapped via [`FixtureDriver::set_elements`].

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use healbrowser_core_types::{DomElementDescriptor, ElementHandle, Locator, LocatorStrategy};

use crate::{Driver, DriverError};

/// One element of a fixture page
#[derive(Clone, Debug, Default)]
pub struct FixtureElement {
    pub tag: String,
    pub id: Option<String>,
    pub text: Option<String>,
    pub aria_label: Option<String>,
    pub data_testid: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub visible: bool,
    pub enabled: bool,
}

impl FixtureElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            visible: true,
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn with_data_testid(mut self, testid: impl Into<String>) -> Self {
        self.data_testid = Some(testid.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Unified attribute lookup used by selector evaluation
    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" => {
                if self.classes.is_empty() {
                    None
                } else {
                    Some(self.classes.join(" "))
                }
            }
            "aria-label" => self.aria_label.clone(),
            "data-testid" => self.data_testid.clone(),
            other => self.attrs.get(other).cloned(),
        }
    }

    fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    fn descriptor(&self, dom_index: usize) -> DomElementDescriptor {
        DomElementDescriptor {
            tag_name: self.tag.clone(),
            text: self.text.clone(),
            aria_label: self.aria_label.clone(),
            data_testid: self.data_testid.clone(),
            id: self.id.clone(),
            classes: self.classes.clone(),
            visible: self.visible,
            enabled: self.enabled,
            dom_index,
        }
    }
}

/// A locator compiled to a decidable element predicate
#[derive(Debug)]
enum CompiledQuery {
    Id(String),
    AriaLabel(String),
    DataTestId(String),
    LinkText(String),
    PartialText(String),
    Css(Vec<CssCompound>),
    XPath(XPathQuery),
}

#[derive(Debug)]
struct CssCompound {
    tag: Option<String>,
    segments: Vec<CssSegment>,
}

#[derive(Debug)]
enum CssSegment {
    Id(String),
    Class(String),
    Attr { name: String, value: Option<String> },
}

#[derive(Debug)]
struct XPathQuery {
    tag: Option<String>,
    predicate: Option<XPathPredicate>,
}

#[derive(Debug)]
enum XPathPredicate {
    AttrEquals { name: String, value: String },
    AttrContains { name: String, value: String },
    TextEquals(String),
    TextContains(String),
}

fn compile(locator: &Locator) -> Result<CompiledQuery, DriverError> {
    let expr = locator.expression.as_str();
    match locator.strategy {
        LocatorStrategy::Id => Ok(CompiledQuery::Id(expr.to_string())),
        LocatorStrategy::AriaLabel => Ok(CompiledQuery::AriaLabel(expr.to_string())),
        LocatorStrategy::DataTestId => Ok(CompiledQuery::DataTestId(expr.to_string())),
        LocatorStrategy::LinkText => Ok(CompiledQuery::LinkText(expr.trim().to_string())),
        LocatorStrategy::PartialText => {
            Ok(CompiledQuery::PartialText(expr.to_lowercase()))
        }
        LocatorStrategy::Css => compile_css(expr).map(CompiledQuery::Css),
        LocatorStrategy::XPath => compile_xpath(expr).map(CompiledQuery::XPath),
    }
}

fn compile_css(selector: &str) -> Result<Vec<CssCompound>, DriverError> {
    selector
        .split(',')
        .map(|part| compile_css_compound(part.trim()))
        .collect()
}

fn compile_css_compound(part: &str) -> Result<CssCompound, DriverError> {
    if part.is_empty() {
        return Err(DriverError::UnsupportedExpression(part.to_string()));
    }

    let boundary = part
        .find(|c| matches!(c, '#' | '.' | '['))
        .unwrap_or(part.len());
    let tag_part = &part[..boundary];
    let tag = match tag_part {
        "" | "*" => None,
        t => Some(t.to_ascii_lowercase()),
    };

    let mut segments = Vec::new();
    let mut rest = &part[boundary..];
    while !rest.is_empty() {
        let (segment, remaining) = match rest.as_bytes()[0] {
            b'#' => {
                let end = css_segment_end(&rest[1..]);
                (CssSegment::Id(rest[1..1 + end].to_string()), &rest[1 + end..])
            }
            b'.' => {
                let end = css_segment_end(&rest[1..]);
                (
                    CssSegment::Class(rest[1..1 + end].to_string()),
                    &rest[1 + end..],
                )
            }
            b'[' => {
                let close = rest
                    .find(']')
                    .ok_or_else(|| DriverError::UnsupportedExpression(part.to_string()))?;
                let inner = &rest[1..close];
                let segment = match inner.split_once('=') {
                    Some((name, value)) => CssSegment::Attr {
                        name: name.trim().to_string(),
                        value: Some(unquote(value.trim()).to_string()),
                    },
                    None => CssSegment::Attr {
                        name: inner.trim().to_string(),
                        value: None,
                    },
                };
                (segment, &rest[close + 1..])
            }
            _ => return Err(DriverError::UnsupportedExpression(part.to_string())),
        };
        segments.push(segment);
        rest = remaining;
    }

    Ok(CssCompound { tag, segments })
}

fn css_segment_end(s: &str) -> usize {
    s.find(|c| matches!(c, '#' | '.' | '[')).unwrap_or(s.len())
}

fn compile_xpath(expr: &str) -> Result<XPathQuery, DriverError> {
    let unsupported = || DriverError::UnsupportedExpression(expr.to_string());

    let body = expr.strip_prefix("//").ok_or_else(unsupported)?;
    let (tag_part, predicate_part) = match body.find('[') {
        Some(open) => {
            let close = body.rfind(']').ok_or_else(unsupported)?;
            if close < open {
                return Err(unsupported());
            }
            (&body[..open], Some(&body[open + 1..close]))
        }
        None => (body, None),
    };

    let tag = match tag_part {
        "" => return Err(unsupported()),
        "*" => None,
        t => Some(t.to_ascii_lowercase()),
    };

    let predicate = predicate_part
        .map(|p| compile_xpath_predicate(p.trim()).ok_or_else(unsupported))
        .transpose()?;

    Ok(XPathQuery { tag, predicate })
}

fn compile_xpath_predicate(pred: &str) -> Option<XPathPredicate> {
    if let Some(rest) = pred.strip_prefix('@') {
        let (name, value) = rest.split_once('=')?;
        return Some(XPathPredicate::AttrEquals {
            name: name.trim().to_string(),
            value: unquote(value.trim()).to_string(),
        });
    }

    if let Some(rest) = pred.strip_prefix("text()=") {
        return Some(XPathPredicate::TextEquals(unquote(rest.trim()).to_string()));
    }

    let inner = pred.strip_prefix("contains(")?.strip_suffix(')')?;
    let (subject, value) = inner.split_once(',')?;
    let subject = subject.trim();
    let value = unquote(value.trim()).to_string();

    if subject == "text()" || subject == "normalize-space()" {
        return Some(XPathPredicate::TextContains(value));
    }
    let attr = subject.strip_prefix('@')?;
    Some(XPathPredicate::AttrContains {
        name: attr.to_string(),
        value,
    })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
        .unwrap_or(value)
}

fn element_matches(element: &FixtureElement, query: &CompiledQuery) -> bool {
    match query {
        CompiledQuery::Id(id) => element.id.as_deref() == Some(id.as_str()),
        CompiledQuery::AriaLabel(label) => {
            element.aria_label.as_deref() == Some(label.as_str())
        }
        CompiledQuery::DataTestId(testid) => {
            element.data_testid.as_deref() == Some(testid.as_str())
        }
        CompiledQuery::LinkText(text) => element.trimmed_text() == Some(text.as_str()),
        CompiledQuery::PartialText(needle) => element
            .trimmed_text()
            .map(|t| t.to_lowercase().contains(needle))
            .unwrap_or(false),
        CompiledQuery::Css(compounds) => compounds
            .iter()
            .any(|compound| css_compound_matches(element, compound)),
        CompiledQuery::XPath(query) => xpath_matches(element, query),
    }
}

fn css_compound_matches(element: &FixtureElement, compound: &CssCompound) -> bool {
    if let Some(tag) = &compound.tag {
        if !element.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    compound.segments.iter().all(|segment| match segment {
        CssSegment::Id(id) => element.id.as_deref() == Some(id.as_str()),
        CssSegment::Class(class) => element.classes.iter().any(|c| c == class),
        CssSegment::Attr { name, value } => match value {
            Some(value) => element.attribute(name).as_deref() == Some(value.as_str()),
            None => element.attribute(name).is_some(),
        },
    })
}

fn xpath_matches(element: &FixtureElement, query: &XPathQuery) -> bool {
    if let Some(tag) = &query.tag {
        if !element.tag.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    match &query.predicate {
        None => true,
        Some(XPathPredicate::AttrEquals { name, value }) => {
            element.attribute(name).as_deref() == Some(value.as_str())
        }
        Some(XPathPredicate::AttrContains { name, value }) => element
            .attribute(name)
            .map(|v| v.contains(value.as_str()))
            .unwrap_or(false),
        Some(XPathPredicate::TextEquals(text)) => {
            element.trimmed_text() == Some(text.as_str())
        }
        Some(XPathPredicate::TextContains(text)) => element
            .trimmed_text()
            .map(|t| t.contains(text.as_str()))
            .unwrap_or(false),
    }
}

/// In-process page model implementing [`Driver`]
#[derive(Default)]
pub struct FixtureDriver {
    elements: Mutex<Vec<FixtureElement>>,
    clicks: Mutex<Vec<ElementHandle>>,
}

impl FixtureDriver {
    pub fn new(elements: Vec<FixtureElement>) -> Self {
        Self {
            elements: Mutex::new(elements),
            clicks: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the page wholesale. Previously issued handles go stale.
    pub fn set_elements(&self, elements: Vec<FixtureElement>) {
        *self.elements.lock().unwrap() = elements;
    }

    /// Handles clicked so far, in click order
    pub fn clicks(&self) -> Vec<ElementHandle> {
        self.clicks.lock().unwrap().clone()
    }

    fn element_at(&self, handle: ElementHandle) -> Result<FixtureElement, DriverError> {
        self.elements
            .lock()
            .unwrap()
            .get(handle.0 as usize)
            .cloned()
            .ok_or(DriverError::StaleElement(handle))
    }
}

#[async_trait]
impl Driver for FixtureDriver {
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, DriverError> {
        let query = compile(locator)?;
        let elements = self.elements.lock().unwrap();
        Ok(elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element_matches(element, &query))
            .map(|(index, _)| ElementHandle(index as u64))
            .collect())
    }

    async fn describe(
        &self,
        handle: ElementHandle,
    ) -> Result<DomElementDescriptor, DriverError> {
        let element = self.element_at(handle)?;
        Ok(element.descriptor(handle.0 as usize))
    }

    async fn click(&self, handle: ElementHandle) -> Result<(), DriverError> {
        let element = self.element_at(handle)?;
        if !element.visible || !element.enabled {
            return Err(DriverError::NotInteractable(handle));
        }
        self.clicks.lock().unwrap().push(handle);
        Ok(())
    }

    async fn page_source(&self) -> Result<String, DriverError> {
        let elements = self.elements.lock().unwrap();
        let mut source = String::new();
        for element in elements.iter() {
            source.push('<');
            source.push_str(&element.tag);
            if let Some(id) = &element.id {
                source.push_str(&format!(" id=\"{id}\""));
            }
            if !element.classes.is_empty() {
                source.push_str(&format!(" class=\"{}\"", element.classes.join(" ")));
            }
            if let Some(label) = &element.aria_label {
                source.push_str(&format!(" aria-label=\"{label}\""));
            }
            if let Some(testid) = &element.data_testid {
                source.push_str(&format!(" data-testid=\"{testid}\""));
            }
            for (name, value) in &element.attrs {
                source.push_str(&format!(" {name}=\"{value}\""));
            }
            source.push('>');
            if let Some(text) = &element.text {
                source.push_str(text);
            }
            source.push_str(&format!("</{}>\n", element.tag));
        }
        Ok(source)
    }
}
