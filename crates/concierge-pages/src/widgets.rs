//! Built-in custom widgets
//!
//! Composite inputs the console uses often enough to ship with the registry:
//!
//! | Id | Widget | Value |
//! |----|--------|-------|
//! | `otp` | [`OtpInput`] | string of entered digits |
//! | `phone` | [`PhoneInput`] | `{"code": "+44", "number": "7700900123"}` |
//! | `chips` | [`ChipSelect`] | array of selected option values |

use crate::binding::{CustomWidget, FieldBinding};
use crate::view::{EventType, View};
use concierge_forms::FieldSchema;
use serde_json::{Value, json};

/// One single-character box per code digit.
#[derive(Debug, Clone)]
pub struct OtpInput {
	pub length: usize,
}

impl Default for OtpInput {
	fn default() -> Self {
		Self { length: 6 }
	}
}

impl OtpInput {
	pub fn new(length: usize) -> Self {
		Self { length }
	}
}

fn otp_slots(value: &Value, length: usize) -> Vec<String> {
	let mut slots: Vec<String> = value
		.as_str()
		.unwrap_or_default()
		.chars()
		.take(length)
		.map(String::from)
		.collect();
	slots.resize(length, String::new());
	slots
}

impl CustomWidget for OtpInput {
	fn render(&self, field: &FieldSchema, binding: FieldBinding) -> View {
		let slots = otp_slots(binding.value(), self.length);
		let length = self.length;
		let boxes = slots.into_iter().enumerate().map(|(index, slot)| {
			let on_input = binding.clone();
			let on_blur = binding.clone();
			View::element("input")
				.attr("type", "text")
				.attr("name", format!("{}-{}", binding.name(), index))
				.attr("inputmode", "numeric")
				.attr("maxlength", "1")
				.attr("autocomplete", "one-time-code")
				.attr("value", slot)
				.flag("disabled", field.disabled)
				.on(EventType::Input, move |event| {
					let mut slots = otp_slots(&on_input.current(), length);
					slots[index] = event
						.value()
						.and_then(|raw| raw.chars().next())
						.map(String::from)
						.unwrap_or_default();
					on_input.set(slots.concat());
				})
				.on(EventType::Blur, move |_| on_blur.blur())
		});

		View::element("div")
			.attr("class", "otp-input")
			.attr("id", binding.path().html_id())
			.attr("role", "group")
			.children(boxes.collect::<Vec<_>>())
			.into()
	}
}

/// Country dial code plus local number.
#[derive(Debug, Clone)]
pub struct PhoneInput {
	/// `(label, dial code)` pairs; the first is the default
	pub countries: Vec<(String, String)>,
}

impl Default for PhoneInput {
	fn default() -> Self {
		Self::new([("US", "+1"), ("GB", "+44"), ("DE", "+49"), ("JP", "+81")])
	}
}

impl PhoneInput {
	pub fn new<L: Into<String>, C: Into<String>>(
		countries: impl IntoIterator<Item = (L, C)>,
	) -> Self {
		Self {
			countries: countries
				.into_iter()
				.map(|(label, code)| (label.into(), code.into()))
				.collect(),
		}
	}

	fn default_code(&self) -> String {
		self.countries
			.first()
			.map(|(_, code)| code.clone())
			.unwrap_or_default()
	}

	/// Splits a stored value into code and number, falling back to defaults.
	fn parts(&self, value: &Value) -> (String, String) {
		let code = value
			.get("code")
			.and_then(Value::as_str)
			.map(str::to_owned)
			.unwrap_or_else(|| self.default_code());
		let number = value
			.get("number")
			.and_then(Value::as_str)
			.unwrap_or_default()
			.to_owned();
		(code, number)
	}
}

impl CustomWidget for PhoneInput {
	fn render(&self, field: &FieldSchema, binding: FieldBinding) -> View {
		let (code, number) = self.parts(binding.value());
		let name = binding.name();

		let options = self.countries.iter().enumerate().map(|(index, (label, dial))| {
			View::element("option")
				.attr("value", index.to_string())
				.flag("selected", *dial == code)
				.child(format!("{} {}", label, dial))
		});
		let on_country = binding.clone();
		let phone = self.clone();
		let country = View::element("select")
			.attr("name", format!("{}-code", name))
			.attr("aria-label", "Country code")
			.flag("disabled", field.disabled)
			.children(options.collect::<Vec<_>>())
			.on(EventType::Change, move |event| {
				let Some((_, dial)) = event
					.selected()
					.first()
					.and_then(|index| phone.countries.get(*index))
				else {
					return;
				};
				let (_, number) = phone.parts(&on_country.current());
				on_country.set(json!({"code": dial, "number": number}));
			});

		let on_number = binding.clone();
		let on_blur = binding.clone();
		let phone = self.clone();
		let local = View::element("input")
			.attr("type", "tel")
			.attr("name", format!("{}-number", name))
			.attr("id", binding.path().html_id())
			.attr("value", number)
			.attr_opt("placeholder", field.placeholder.clone())
			.flag("disabled", field.disabled)
			.on(EventType::Input, move |event| {
				let (code, _) = phone.parts(&on_number.current());
				on_number.set(json!({"code": code, "number": event.value().unwrap_or_default()}));
			})
			.on(EventType::Blur, move |_| on_blur.blur());

		View::element("div")
			.attr("class", "phone-input")
			.child(country)
			.child(local)
			.into()
	}
}

/// Multi-select rendered as toggle chips, one per option.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChipSelect;

impl CustomWidget for ChipSelect {
	fn render(&self, field: &FieldSchema, binding: FieldBinding) -> View {
		let selected = binding.value().as_array().cloned().unwrap_or_default();
		let chips = field.options.iter().map(|option| {
			let pressed = selected.contains(&option.value);
			let on_click = binding.clone();
			let value = option.value.clone();
			View::element("button")
				.attr("type", "button")
				.attr("class", if pressed { "chip chip-selected" } else { "chip" })
				.attr("aria-pressed", pressed.to_string())
				.attr("data-value", value.to_string())
				.flag("disabled", field.disabled)
				.child(option.label.clone())
				.on(EventType::Click, move |_| {
					let mut current = on_click.current().as_array().cloned().unwrap_or_default();
					match current.iter().position(|item| *item == value) {
						Some(index) => {
							current.remove(index);
						}
						None => current.push(value.clone()),
					}
					on_click.set(Value::Array(current));
				})
		});

		View::element("div")
			.attr("class", "chip-select")
			.attr("id", binding.path().html_id())
			.attr("role", "group")
			.children(chips.collect::<Vec<_>>())
			.into()
	}
}
