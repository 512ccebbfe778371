//! Typed banner document tree and its HTML serializer.
//!
//! The synthesizer builds an `AdDocument`; `render()` is a pure, separate
//! step. The guard inspects both the tree and the rendered text, so a value
//! that is right in the tree but serialized wrong is still caught.

use std::borrow::Cow;
use std::fmt::{self, Write as _};

use crate::synthesis::creative::SizeKey;

/// `id` of the root clickable container.
pub const ROOT_ID: &str = "ad";
/// Name of the click-tag slot in the document's runtime state.
pub const CLICK_TAG_SLOT: &str = "window.clickTag";
/// The only asset paths a document may reference. They ship in every archive folder.
pub const PACKAGE_ASSETS: [&str; 2] = ["assets/logo.png", "assets/bg.jpg"];
pub const LOGO_ASSET: &str = PACKAGE_ASSETS[0];

const DOCUMENT_LANG: &str = "pt-BR";

/// Option selection is single-select, first option selected on load. Option
/// clicks never bubble to the root, and Enter on a focused option only
/// selects it, so selecting never navigates.
const BEHAVIOR_SCRIPT: &str = "\
(function () {
  var ad = document.getElementById('ad');
  var options = Array.prototype.slice.call(ad.querySelectorAll('.opt'));
  function select(target) {
    options.forEach(function (o) {
      var on = o === target;
      o.classList.toggle('selected', on);
      o.setAttribute('aria-pressed', on ? 'true' : 'false');
    });
  }
  function navigate() {
    var destination = window.clickTag;
    window.open(destination, '_blank');
  }
  options.forEach(function (o) {
    o.addEventListener('click', function (e) {
      e.preventDefault();
      e.stopPropagation();
      select(o);
    });
  });
  ad.addEventListener('click', navigate);
  ad.addEventListener('keydown', function (e) {
    if (e.key !== 'Enter') { return; }
    if (e.target.closest && e.target.closest('.opt')) { return; }
    navigate();
  });
  if (options.length) { select(options[0]); }
})();";

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
        }
    }

    /// Builder-style declaration append.
    pub fn decl(mut self, property: &'static str, value: impl ToString) -> Self {
        self.declarations.push(Declaration {
            property,
            value: value.to_string(),
        });
        self
    }

    /// First value declared for `property`.
    pub fn value(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|d| d.property == property)
            .map(|d| d.value.as_str())
    }
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{{", self.selector)?;
        for (i, d) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_char(';')?;
            }
            write!(f, "{}:{}", d.property, d.value)?;
        }
        f.write_char('}')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyframes {
    pub name: &'static str,
    pub stops: Vec<StyleRule>,
}

impl fmt::Display for Keyframes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@keyframes {}{{", self.name)?;
        for stop in &self.stops {
            write!(f, "{stop}")?;
        }
        f.write_char('}')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
    pub keyframes: Vec<Keyframes>,
}

impl StyleSheet {
    pub fn rule(&self, selector: &str) -> Option<&StyleRule> {
        self.rules.iter().find(|r| r.selector == selector)
    }
}

impl fmt::Display for StyleSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        for keyframes in &self.keyframes {
            writeln!(f, "{keyframes}")?;
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Nodes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Container {
        id: Option<&'static str>,
        class: Option<&'static str>,
        /// Root-level navigation target: clicks resolve through the click-tag slot.
        clickable: bool,
        children: Vec<Node>,
    },
    Text {
        class: &'static str,
        text: String,
    },
    /// Single-select option buttons; `selected` is the index highlighted on load.
    OptionRow {
        options: Vec<String>,
        selected: usize,
    },
    CallToAction {
        label: String,
    },
    Disclaimer {
        text: String,
    },
    Logo {
        asset: &'static str,
    },
}

impl Node {
    pub fn container(class: &'static str, children: Vec<Node>) -> Self {
        Node::Container {
            id: None,
            class: Some(class),
            clickable: false,
            children,
        }
    }

    pub fn text(class: &'static str, text: impl Into<String>) -> Self {
        Node::Text {
            class,
            text: text.into(),
        }
    }

    /// Depth-first, pre-order visit of this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        if let Node::Container { children, .. } = self {
            for child in children {
                child.walk(visit);
            }
        }
    }

    /// All nodes matching `pred`, in document order.
    pub fn find_all(&self, pred: impl Fn(&Node) -> bool) -> Vec<&Node> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if pred(node) {
                found.push(node);
            }
        });
        found
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Container {
                id,
                class,
                clickable,
                children,
            } => {
                f.write_str("<div")?;
                if let Some(id) = id {
                    write!(f, " id=\"{id}\"")?;
                }
                if let Some(class) = class {
                    write!(f, " class=\"{class}\"")?;
                }
                if *clickable {
                    f.write_str(" role=\"link\" tabindex=\"0\"")?;
                }
                f.write_char('>')?;
                for child in children {
                    write!(f, "{child}")?;
                }
                f.write_str("</div>")
            }
            Node::Text { class, text } => {
                write!(f, "<div class=\"{class}\">{}</div>", escape_html(text))
            }
            Node::OptionRow { options, selected } => {
                f.write_str("<div class=\"options\"><div class=\"stack\">")?;
                for (i, label) in options.iter().enumerate() {
                    let (class, pressed) = if i == *selected {
                        ("opt selected", "true")
                    } else {
                        ("opt", "false")
                    };
                    write!(
                        f,
                        "<button class=\"{class}\" type=\"button\" data-i=\"{i}\" aria-pressed=\"{pressed}\"><span class=\"opt-txt\">{}</span></button>",
                        escape_html(label)
                    )?;
                }
                f.write_str("</div></div>")
            }
            Node::CallToAction { label } => {
                write!(f, "<div class=\"cta\">{}</div>", escape_html(label))
            }
            Node::Disclaimer { text } => {
                write!(f, "<div class=\"foot\">{}</div>", escape_html(text))
            }
            Node::Logo { .. } => f.write_str("<div class=\"logo\" aria-hidden=\"true\"></div>"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdDocument {
    /// Declared ad-size metadata.
    pub ad_size: SizeKey,
    pub title: String,
    pub styles: StyleSheet,
    pub root: Node,
    /// Value written once into the click-tag slot at load.
    pub click_tag: String,
}

impl AdDocument {
    /// Serializes the document. Pure: identical trees give identical bytes.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// The exact ad-size meta element this document declares.
    pub fn ad_size_meta(size: SizeKey) -> String {
        format!(
            "<meta name=\"ad.size\" content=\"width={},height={}\">",
            size.width, size.height
        )
    }

    /// The single click-tag assignment statement.
    pub fn click_tag_assignment(destination: &str) -> String {
        format!("{CLICK_TAG_SLOT} = \"{}\";", escape_js_string(destination))
    }
}

impl fmt::Display for AdDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<!DOCTYPE html><html lang=\"{DOCUMENT_LANG}\"><head>"
        )?;
        writeln!(f, "<meta charset=\"utf-8\">")?;
        writeln!(f, "{}", Self::ad_size_meta(self.ad_size))?;
        writeln!(f, "<title>{}</title>", escape_html(&self.title))?;
        writeln!(f, "<style>")?;
        write!(f, "{}", self.styles)?;
        writeln!(f, "</style>")?;
        writeln!(f, "</head><body>")?;
        writeln!(f, "{}", self.root)?;
        writeln!(f, "<script>")?;
        writeln!(f, "{}", Self::click_tag_assignment(&self.click_tag))?;
        writeln!(f, "{BEHAVIOR_SCRIPT}")?;
        writeln!(f, "</script>")?;
        f.write_str("</body></html>")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Escaping
// ────────────────────────────────────────────────────────────────────────────

pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escapes `text` for a double-quoted JavaScript string inside a `<script>` element.
pub fn escape_js_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}
