use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Layout {
	pub tiling: Tiling,
	pub layouts: Layouts,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Tiling {
	/// factor of the master area size, within [`Tiling::MFACT_RANGE`]
	pub mfact: f32,
	/// number of clients in the master area
	pub nmaster: u32,
	/// respect size hints in tiled resizals
	pub resize_hints: bool,
}

impl Tiling {
	pub const MFACT_RANGE: std::ops::RangeInclusive<f32> = 0.05..=0.95;
}

impl Default for Tiling {
	fn default() -> Self {
		Tiling {
			mfact: 0.55,
			nmaster: 1,
			resize_hints: false,
		}
	}
}

/// the arrangement algorithms known to the window manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrange {
	Tile,
	Monocle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
	pub symbol: String,
	/// no arrangement means floating behaviour
	#[serde(default)]
	pub arrange: Option<Arrange>,
}

impl LayoutEntry {
	pub fn new(symbol: impl Into<String>, arrange: Option<Arrange>) -> Self {
		LayoutEntry {
			symbol: symbol.into(),
			arrange,
		}
	}

	pub fn is_floating(&self) -> bool {
		self.arrange.is_none()
	}
}

/// the ordered layout table, the first entry is the default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layouts(Vec<LayoutEntry>);

impl Default for Layouts {
	fn default() -> Self {
		Layouts(vec![
			LayoutEntry::new("[]=", Some(Arrange::Tile)),
			LayoutEntry::new("><>", None),
			LayoutEntry::new("[M]", Some(Arrange::Monocle)),
		])
	}
}

impl Layouts {
	pub fn new(layouts: Vec<LayoutEntry>) -> Self {
		Layouts(layouts)
	}

	/// the layout at `index`
	pub fn active(&self, index: usize) -> Option<&LayoutEntry> {
		self.0.get(index)
	}

	/// the layout a monitor starts with
	pub fn initial(&self) -> Option<&LayoutEntry> {
		self.0.first()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &LayoutEntry> {
		self.0.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::{Arrange, LayoutEntry, Layouts, Tiling};
	use pretty_assertions::assert_eq;

	#[test]
	fn first_entry_is_default() {
		let layouts = Layouts::default();
		let initial = layouts.initial().unwrap();

		assert_eq!(initial, layouts.active(0).unwrap());
		assert_eq!(initial.arrange, Some(Arrange::Tile));
		assert!(!initial.is_floating());
	}

	#[test]
	fn null_arrangement_floats() {
		let layouts = Layouts::default();
		assert!(layouts.active(1).unwrap().is_floating());
		assert!(!layouts.active(2).unwrap().is_floating());
		assert_eq!(layouts.active(3), None);
	}

	#[test]
	fn deserialize_floating_entry() {
		let entry = serde_json::from_str::<LayoutEntry>(r#"{ "symbol": "~" }"#).unwrap();
		assert_eq!(entry, LayoutEntry::new("~", None));
	}

	#[test]
	fn default_tiling() {
		let tiling = Tiling::default();
		assert!(Tiling::MFACT_RANGE.contains(&tiling.mfact));
		assert_eq!(tiling.nmaster, 1);
		assert!(!tiling.resize_hints);
	}
}
