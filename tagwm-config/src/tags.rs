use serde::{Deserialize, Serialize};
use std::{
	fmt::{Debug, Display},
	ops::{BitAnd, BitOr, Not},
};

/// the bit width of [`TagMask`], and so the maximum number of tags
pub const MAX_TAGS: usize = u32::BITS as usize;

/// a set of tags, one bit per tag index
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMask(u32);

impl TagMask {
	pub const EMPTY: TagMask = TagMask(0);
	/// every tag, including bits beyond the configured tag count
	pub const ALL: TagMask = TagMask(!0);

	pub const fn new(bits: u32) -> Self {
		TagMask(bits)
	}

	/// the mask of the single tag at `index`
	///
	/// # Panics
	///
	/// panics if `index` is not smaller than [`MAX_TAGS`]
	pub const fn tag(index: usize) -> Self {
		assert!(index < MAX_TAGS, "tag index out of range");
		TagMask(1 << index)
	}

	pub const fn bits(self) -> u32 {
		self.0
	}

	pub const fn is_empty(self) -> bool {
		self.0 == 0
	}

	pub const fn contains(self, other: TagMask) -> bool {
		self.0 & other.0 == other.0
	}

	/// iterate over the indices of all set tags
	pub fn indices(self) -> impl Iterator<Item = usize> {
		(0..MAX_TAGS).filter(move |&i| self.0 & (1 << i) != 0)
	}
}

impl BitAnd for TagMask {
	type Output = TagMask;

	fn bitand(self, rhs: Self) -> Self::Output {
		TagMask(self.0 & rhs.0)
	}
}

impl BitOr for TagMask {
	type Output = TagMask;

	fn bitor(self, rhs: Self) -> Self::Output {
		TagMask(self.0 | rhs.0)
	}
}

impl Not for TagMask {
	type Output = TagMask;

	fn not(self) -> Self::Output {
		TagMask(!self.0)
	}
}

impl Debug for TagMask {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "TagMask({:#b})", self.0)
	}
}

impl Display for TagMask {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if *self == TagMask::ALL {
			return f.write_str("all");
		}

		let mut first = true;
		for index in self.indices() {
			if !first {
				f.write_str(",")?;
			}
			write!(f, "{}", index + 1)?;
			first = false;
		}

		if first {
			f.write_str("none")?;
		}

		Ok(())
	}
}

/// ordered tag labels, the label at index `i` names the tag with bit `1 << i`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Default for Tags {
	fn default() -> Self {
		let tags = (1..=9).map(|i| i.to_string()).collect();
		Tags(tags)
	}
}

impl Tags {
	pub fn new(labels: Vec<String>) -> Self {
		Tags(labels)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn label(&self, index: usize) -> Option<&str> {
		self.0.get(index).map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// the mask covering every configured tag
	pub fn mask(&self) -> TagMask {
		match self.0.len() {
			0 => TagMask::EMPTY,
			len if len >= MAX_TAGS => TagMask::ALL,
			len => TagMask((1 << len) - 1),
		}
	}
}
