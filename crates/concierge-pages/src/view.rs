//! View tree
//!
//! [`View`] is the output of every renderer in this crate: elements, text,
//! fragments and nothing. A tree renders to an HTML string for SSR, and
//! element event handlers can be dispatched directly, which is how field
//! edits flow back into a form without a browser.

use std::borrow::Cow;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Handler attached to an element event.
pub type EventHandler = Rc<dyn Fn(&Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
	Input,
	Change,
	Blur,
	Click,
	Submit,
}

impl EventType {
	pub fn as_str(self) -> &'static str {
		match self {
			EventType::Input => "input",
			EventType::Change => "change",
			EventType::Blur => "blur",
			EventType::Click => "click",
			EventType::Submit => "submit",
		}
	}
}

/// Payload of a dispatched event.
///
/// Carries what the target element would report: the text value of an input,
/// the checked state of a checkbox, the selected option indices of a select.
#[derive(Debug, Default)]
pub struct Event {
	value: Option<String>,
	checked: Option<bool>,
	selected: Vec<usize>,
	default_prevented: Cell<bool>,
}

impl Event {
	/// Event with no payload (blur, click, submit).
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn with_value(value: impl Into<String>) -> Self {
		Self {
			value: Some(value.into()),
			..Self::default()
		}
	}

	pub fn with_checked(checked: bool) -> Self {
		Self {
			checked: Some(checked),
			..Self::default()
		}
	}

	pub fn with_selected(indices: impl IntoIterator<Item = usize>) -> Self {
		Self {
			selected: indices.into_iter().collect(),
			..Self::default()
		}
	}

	pub fn value(&self) -> Option<&str> {
		self.value.as_deref()
	}

	pub fn checked(&self) -> Option<bool> {
		self.checked
	}

	pub fn selected(&self) -> &[usize] {
		&self.selected
	}

	pub fn prevent_default(&self) {
		self.default_prevented.set(true);
	}

	pub fn default_prevented(&self) -> bool {
		self.default_prevented.get()
	}
}

/// A unified representation of renderable content.
#[derive(Debug)]
pub enum View {
	Element(ElementView),
	Text(Cow<'static, str>),
	/// Several views without a wrapper element
	Fragment(Vec<View>),
	Empty,
}

/// Represents a DOM element in the view tree.
pub struct ElementView {
	tag: Cow<'static, str>,
	attrs: Vec<(Cow<'static, str>, Cow<'static, str>)>,
	children: Vec<View>,
	/// Void elements render without a closing tag
	is_void: bool,
	event_handlers: Vec<(EventType, EventHandler)>,
}

impl fmt::Debug for ElementView {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ElementView")
			.field("tag", &self.tag)
			.field("attrs", &self.attrs)
			.field("children", &self.children)
			.field("is_void", &self.is_void)
			.field("event_handlers_count", &self.event_handlers.len())
			.finish()
	}
}

impl ElementView {
	pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
		let tag = tag.into();
		let is_void = matches!(
			tag.as_ref(),
			"area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
				| "source" | "track" | "wbr"
		);
		Self {
			tag,
			attrs: Vec::new(),
			children: Vec::new(),
			is_void,
			event_handlers: Vec::new(),
		}
	}

	pub fn attr(
		mut self,
		name: impl Into<Cow<'static, str>>,
		value: impl Into<Cow<'static, str>>,
	) -> Self {
		self.attrs.push((name.into(), value.into()));
		self
	}

	/// Adds a boolean attribute (`disabled=""`) when `on` is set.
	pub fn flag(self, name: &'static str, on: bool) -> Self {
		if on { self.attr(name, "") } else { self }
	}

	/// Adds an attribute only when a value is present.
	pub fn attr_opt(self, name: &'static str, value: Option<impl Into<Cow<'static, str>>>) -> Self {
		match value {
			Some(value) => self.attr(name, value),
			None => self,
		}
	}

	pub fn child(mut self, child: impl IntoView) -> Self {
		self.children.push(child.into_view());
		self
	}

	pub fn children(mut self, children: impl IntoIterator<Item = impl IntoView>) -> Self {
		self.children
			.extend(children.into_iter().map(|c| c.into_view()));
		self
	}

	pub fn on(mut self, event_type: EventType, handler: impl Fn(&Event) + 'static) -> Self {
		self.event_handlers.push((event_type, Rc::new(handler)));
		self
	}

	pub fn tag_name(&self) -> &str {
		&self.tag
	}

	pub fn attrs(&self) -> &[(Cow<'static, str>, Cow<'static, str>)] {
		&self.attrs
	}

	/// Value of the first attribute named `name`.
	pub fn get_attr(&self, name: &str) -> Option<&str> {
		self.attrs
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_ref())
	}

	pub fn has_attr(&self, name: &str) -> bool {
		self.get_attr(name).is_some()
	}

	pub fn child_views(&self) -> &[View] {
		&self.children
	}

	pub fn is_void(&self) -> bool {
		self.is_void
	}

	pub fn event_handlers(&self) -> &[(EventType, EventHandler)] {
		&self.event_handlers
	}

	/// Runs every handler registered for `event_type`.
	///
	/// Returns `false` when the element does not listen to that event.
	pub fn dispatch(&self, event_type: EventType, event: &Event) -> bool {
		let mut handled = false;
		for (kind, handler) in &self.event_handlers {
			if *kind == event_type {
				handler(event);
				handled = true;
			}
		}
		handled
	}

	/// Concatenated text of all descendants.
	pub fn text_content(&self) -> String {
		let mut out = String::new();
		for child in &self.children {
			child.collect_text(&mut out);
		}
		out
	}
}

impl View {
	pub fn element(tag: impl Into<Cow<'static, str>>) -> ElementView {
		ElementView::new(tag)
	}

	pub fn text(content: impl Into<Cow<'static, str>>) -> Self {
		Self::Text(content.into())
	}

	pub fn fragment(children: impl IntoIterator<Item = impl IntoView>) -> Self {
		Self::Fragment(children.into_iter().map(|c| c.into_view()).collect())
	}

	pub fn empty() -> Self {
		Self::Empty
	}

	pub fn is_empty(&self) -> bool {
		match self {
			View::Empty => true,
			View::Fragment(children) => children.iter().all(View::is_empty),
			_ => false,
		}
	}

	pub fn as_element(&self) -> Option<&ElementView> {
		match self {
			View::Element(el) => Some(el),
			_ => None,
		}
	}

	/// Renders the view to an HTML string.
	///
	/// # Examples
	///
	/// ```
	/// use concierge_pages::View;
	///
	/// let view = View::element("p")
	///     .attr("class", "hint")
	///     .child("Use <b> sparingly");
	/// assert_eq!(
	///     View::from(view).render_to_string(),
	///     r#"<p class="hint">Use &lt;b&gt; sparingly</p>"#
	/// );
	/// ```
	pub fn render_to_string(&self) -> String {
		let mut output = String::new();
		self.render_to_string_inner(&mut output);
		output
	}

	fn render_to_string_inner(&self, output: &mut String) {
		match self {
			View::Element(el) => {
				output.push('<');
				output.push_str(el.tag_name());

				for (name, value) in el.attrs() {
					output.push(' ');
					output.push_str(name);
					output.push_str("=\"");
					output.push_str(&html_escape(value));
					output.push('"');
				}

				if el.is_void() {
					output.push_str(" />");
				} else {
					output.push('>');
					for child in el.child_views() {
						child.render_to_string_inner(output);
					}
					output.push_str("</");
					output.push_str(el.tag_name());
					output.push('>');
				}
			}
			View::Text(text) => output.push_str(&html_escape(text)),
			View::Fragment(children) => {
				for child in children {
					child.render_to_string_inner(output);
				}
			}
			View::Empty => {}
		}
	}

	/// First element, depth first, matching `predicate`.
	pub fn find(&self, predicate: impl Fn(&ElementView) -> bool) -> Option<&ElementView> {
		self.find_all(predicate).into_iter().next()
	}

	/// All elements, in document order, matching `predicate`.
	pub fn find_all(&self, predicate: impl Fn(&ElementView) -> bool) -> Vec<&ElementView> {
		let mut found = Vec::new();
		self.collect_matching(&predicate, &mut found);
		found
	}

	/// First element whose attribute `name` equals `value`.
	pub fn find_by_attr(&self, name: &str, value: &str) -> Option<&ElementView> {
		self.find(|el| el.get_attr(name) == Some(value))
	}

	pub fn find_by_tag(&self, tag: &str) -> Option<&ElementView> {
		self.find(|el| el.tag_name() == tag)
	}

	pub fn text_content(&self) -> String {
		let mut out = String::new();
		self.collect_text(&mut out);
		out
	}

	fn collect_matching<'a>(
		&'a self,
		predicate: &dyn Fn(&ElementView) -> bool,
		found: &mut Vec<&'a ElementView>,
	) {
		match self {
			View::Element(el) => {
				if predicate(el) {
					found.push(el);
				}
				for child in el.child_views() {
					child.collect_matching(predicate, found);
				}
			}
			View::Fragment(children) => {
				for child in children {
					child.collect_matching(predicate, found);
				}
			}
			View::Text(_) | View::Empty => {}
		}
	}

	fn collect_text(&self, out: &mut String) {
		match self {
			View::Element(el) => {
				for child in el.child_views() {
					child.collect_text(out);
				}
			}
			View::Text(text) => out.push_str(text),
			View::Fragment(children) => {
				for child in children {
					child.collect_text(out);
				}
			}
			View::Empty => {}
		}
	}
}

impl From<ElementView> for View {
	fn from(el: ElementView) -> Self {
		View::Element(el)
	}
}

pub trait IntoView {
	fn into_view(self) -> View;
}

impl IntoView for View {
	fn into_view(self) -> View {
		self
	}
}

impl IntoView for ElementView {
	fn into_view(self) -> View {
		View::Element(self)
	}
}

impl IntoView for String {
	fn into_view(self) -> View {
		View::Text(Cow::Owned(self))
	}
}

impl IntoView for &'static str {
	fn into_view(self) -> View {
		View::Text(Cow::Borrowed(self))
	}
}

impl<T: IntoView> IntoView for Option<T> {
	fn into_view(self) -> View {
		match self {
			Some(v) => v.into_view(),
			None => View::Empty,
		}
	}
}

impl<T: IntoView> IntoView for Vec<T> {
	fn into_view(self) -> View {
		View::Fragment(self.into_iter().map(|v| v.into_view()).collect())
	}
}

impl IntoView for () {
	fn into_view(self) -> View {
		View::Empty
	}
}

impl<A: IntoView, B: IntoView> IntoView for (A, B) {
	fn into_view(self) -> View {
		View::Fragment(vec![self.0.into_view(), self.1.into_view()])
	}
}

fn html_escape(s: &str) -> Cow<'_, str> {
	if s.contains(['&', '<', '>', '"', '\'']) {
		let mut escaped = String::with_capacity(s.len() + 8);
		for c in s.chars() {
			match c {
				'&' => escaped.push_str("&amp;"),
				'<' => escaped.push_str("&lt;"),
				'>' => escaped.push_str("&gt;"),
				'"' => escaped.push_str("&quot;"),
				'\'' => escaped.push_str("&#x27;"),
				_ => escaped.push(c),
			}
		}
		Cow::Owned(escaped)
	} else {
		Cow::Borrowed(s)
	}
}
