use serde::{Deserialize, Serialize, de::Visitor};
use std::fmt::Display;

/// fully opaque alpha value
pub const OPAQUE: u8 = 0xff;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Appearance {
	/// border pixel of windows
	pub border: u32,
	/// snap distance in pixels
	pub snap: u32,
	/// gaps between windows
	pub gaps: u32,
	/// whether gaps are enabled at startup
	pub start_with_gaps: bool,
	pub bar: Bar,
	pub fonts: Vec<String>,
	/// font handed to the launcher
	pub launcher_font: String,
	pub colors: ColorScheme,
	pub alphas: AlphaScheme,
}

impl Default for Appearance {
	fn default() -> Self {
		Appearance {
			border: 1,
			snap: 32,
			gaps: 6,
			start_with_gaps: true,
			bar: Bar::default(),
			fonts: vec!["Misc Termsyn:size=10".to_owned()],
			launcher_font: "Misc Termsyn:size=10".to_owned(),
			colors: ColorScheme::default(),
			alphas: AlphaScheme::default(),
		}
	}
}

impl Appearance {
	/// colors of a scheme, with their alpha values applied
	pub fn scheme(&self, scheme: Scheme) -> [u32; 3] {
		let colors = self.colors.get(scheme);
		let alphas = self.alphas.get(scheme);

		[
			colors.fg.argb(alphas.fg),
			colors.bg.argb(alphas.bg),
			colors.border.argb(alphas.border),
		]
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Bar {
	pub show: bool,
	/// `false` places the bar at the bottom
	pub top: bool,
	/// bar height, `0` derives it from the font height
	pub height: u32,
	pub vertical_padding: u32,
	pub side_padding: u32,
}

impl Default for Bar {
	fn default() -> Self {
		Bar {
			show: true,
			top: true,
			height: 17,
			vertical_padding: 6,
			side_padding: 6,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scheme {
	Normal,
	Selected,
}

/// one entry per [`Scheme`], a missing entry fails to deserialize
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorScheme {
	pub normal: SchemeColors,
	pub selected: SchemeColors,
}

impl Default for ColorScheme {
	fn default() -> Self {
		ColorScheme {
			normal: SchemeColors {
				fg: Color::GRAY3,
				bg: Color::GRAY1,
				border: Color::GRAY2,
			},
			selected: SchemeColors {
				fg: Color::GRAY4,
				bg: Color::ACCENT,
				border: Color::ACCENT,
			},
		}
	}
}

impl ColorScheme {
	pub fn get(&self, scheme: Scheme) -> &SchemeColors {
		match scheme {
			Scheme::Normal => &self.normal,
			Scheme::Selected => &self.selected,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchemeColors {
	pub fg: Color,
	pub bg: Color,
	pub border: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AlphaScheme {
	pub normal: SchemeAlpha,
	pub selected: SchemeAlpha,
}

impl Default for AlphaScheme {
	fn default() -> Self {
		let alpha = SchemeAlpha {
			fg: OPAQUE,
			bg: 50,
			border: OPAQUE,
		};

		AlphaScheme {
			normal: alpha,
			selected: alpha,
		}
	}
}

impl AlphaScheme {
	pub fn get(&self, scheme: Scheme) -> &SchemeAlpha {
		match scheme {
			Scheme::Normal => &self.normal,
			Scheme::Selected => &self.selected,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SchemeAlpha {
	pub fg: u8,
	pub bg: u8,
	pub border: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color([u8; 3]);

impl Color {
	/// bar background
	pub const GRAY1: Color = Color::new(0x28, 0x28, 0x28);
	/// inactive border
	pub const GRAY2: Color = Color::new(0x44, 0x44, 0x44);
	/// inactive text
	pub const GRAY3: Color = Color::new(0xcc, 0xcc, 0xcc);
	/// active text
	pub const GRAY4: Color = Color::new(0xee, 0xee, 0xee);
	/// active background and border
	pub const ACCENT: Color = Color::new(0x92, 0x83, 0x74);
}

impl Color {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Color([r, g, b])
	}

	/// pack into a `0xAARRGGBB` pixel
	pub const fn argb(self, alpha: u8) -> u32 {
		u32::from_be_bytes([alpha, self.0[0], self.0[1], self.0[2]])
	}
}

impl Display for Color {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let [r, g, b] = self.0;
		write!(f, "#{r:02x}{g:02x}{b:02x}")
	}
}

impl Serialize for Color {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for Color {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_str(ColorVis)
	}
}

struct ColorVis;

impl Visitor<'_> for ColorVis {
	type Value = Color;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("a hex color")
	}

	fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
		let hex = hex_color(v)
			.ok_or_else(|| serde::de::Error::custom(format_args!("invalid hex color {:?}", v)))?;
		Ok(Color(hex))
	}
}

fn hex_digit(c: u8) -> Option<u8> {
	match c {
		b'0'..=b'9' => Some(c - b'0'),
		b'A'..=b'F' => Some(c - b'A' + 10),
		b'a'..=b'f' => Some(c - b'a' + 10),
		_ => None,
	}
}

fn hex_color(s: &str) -> Option<[u8; 3]> {
	let hex = s.strip_prefix("#")?;
	if let [r1, r2, g1, g2, b1, b2] = hex.as_bytes() {
		let color = [
			hex_digit(*r1)? * 16 + hex_digit(*r2)?,
			hex_digit(*g1)? * 16 + hex_digit(*g2)?,
			hex_digit(*b1)? * 16 + hex_digit(*b2)?,
		];
		Some(color)
	} else {
		None
	}
}

#[cfg(test)]
mod tests {
	use super::{Appearance, Color, Scheme, hex_color};
	use pretty_assertions::assert_eq;

	#[test]
	fn parse_hex() {
		assert_eq!(hex_color("#282828"), Some([0x28, 0x28, 0x28]));
		assert_eq!(hex_color("#AbCdEf"), Some([0xab, 0xcd, 0xef]));
		assert_eq!(hex_color("282828"), None);
		assert_eq!(hex_color("#28282"), None);
		assert_eq!(hex_color("#28282g"), None);
	}

	#[test]
	fn display_matches_input() {
		assert_eq!(Color::ACCENT.to_string(), "#928374");
		assert_eq!(Color::GRAY3.to_string(), "#cccccc");
	}

	#[test]
	fn deserialize() {
		let color = serde_json::from_str::<Color>("\"#444444\"").unwrap();
		assert_eq!(color, Color::GRAY2);

		let err = serde_json::from_str::<Color>("\"red\"").unwrap_err();
		assert!(err.to_string().contains("invalid hex color"));
	}

	#[test]
	fn scheme_with_alpha() {
		let appearance = Appearance::default();
		let [fg, bg, border] = appearance.scheme(Scheme::Selected);

		assert_eq!(fg, 0xffeeeeee);
		assert_eq!(bg, 0x32928374);
		assert_eq!(border, 0xff928374);
	}

	#[test]
	fn missing_scheme_is_rejected() {
		let json = r##"{ "normal": { "fg": "#000000", "bg": "#000000", "border": "#000000" } }"##;
		assert!(serde_json::from_str::<super::ColorScheme>(json).is_err());
	}
}
