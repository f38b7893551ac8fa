use crate::tags::TagMask;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize, de::Visitor};

/// ordered window rules, the first matching rule wins
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WindowRules(Vec<WindowRule>);

impl Default for WindowRules {
	fn default() -> Self {
		WindowRules(vec![
			WindowRule {
				class: Some(Match::Plain("Gimp".to_owned())),
				instance: None,
				title: None,
				tags: TagMask::EMPTY,
				floating: true,
				monitor: None,
			},
			WindowRule {
				class: Some(Match::Plain("Firefox".to_owned())),
				instance: None,
				title: None,
				tags: TagMask::tag(8),
				floating: false,
				monitor: None,
			},
		])
	}
}

impl WindowRules {
	pub fn new(rules: Vec<WindowRule>) -> Self {
		WindowRules(rules)
	}

	/// find the first rule matching a window
	pub fn resolve(&self, class: Option<&str>, instance: Option<&str>, title: Option<&str>) -> Option<&WindowRule> {
		self.0.iter().find(|rule| rule.r#match(class, instance, title))
	}

	/// compute where a newly mapped window goes
	///
	/// `view` is the tagset currently shown on the selected monitor,
	/// `tag_mask` the mask of all configured tags
	pub fn apply(
		&self,
		class: Option<&str>,
		instance: Option<&str>,
		title: Option<&str>,
		view: TagMask,
		tag_mask: TagMask,
	) -> Placement {
		let Some(rule) = self.resolve(class, instance, title) else {
			tracing::debug!(?class, ?instance, ?title, "no window rule matched");
			return Placement {
				tags: view,
				floating: false,
				monitor: None,
			};
		};

		let tags = rule.tags & tag_mask;
		let tags = if tags.is_empty() { view } else { tags };

		Placement {
			tags,
			floating: rule.floating,
			monitor: rule.monitor,
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = &WindowRule> {
		self.0.iter()
	}
}

/// the initial state of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
	pub tags: TagMask,
	pub floating: bool,
	/// `None` keeps the window on the selected monitor
	pub monitor: Option<u32>,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRule {
	// * matchers, an absent matcher matches anything * //
	pub class: Option<Match>,
	pub instance: Option<Match>,
	pub title: Option<Match>,

	// * policy * //
	#[serde(default)]
	pub tags: TagMask,
	#[serde(default)]
	pub floating: bool,
	#[serde(default)]
	pub monitor: Option<u32>,
}

impl WindowRule {
	fn r#match(&self, class: Option<&str>, instance: Option<&str>, title: Option<&str>) -> bool {
		fn field(matcher: Option<&Match>, value: Option<&str>) -> bool {
			match matcher {
				None => true,
				Some(matcher) => value.is_some_and(|value| matcher.r#match(value)),
			}
		}

		field(self.class.as_ref(), class)
			&& field(self.instance.as_ref(), instance)
			&& field(self.title.as_ref(), title)
	}
}

#[derive(Debug)]
pub enum Match {
	Regex {
		regex: Regex,
		inverted: bool,
		case_insensitive: bool,
	},
	Plain(String),
}

impl Match {
	fn r#match(&self, haystack: &str) -> bool {
		match self {
			Match::Regex { regex, inverted, .. } => regex.is_match(haystack) ^ inverted,
			Match::Plain(plain) => plain == haystack,
		}
	}
}

impl Serialize for Match {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Match::Plain(plain) => serializer.serialize_str(plain),
			Match::Regex {
				regex,
				inverted,
				case_insensitive,
			} => {
				// strip the implicit anchors again
				let pattern = regex.as_str();
				let pattern = pattern
					.strip_prefix("^(?:")
					.and_then(|p| p.strip_suffix(")$"))
					.unwrap_or(pattern);

				let v = if *inverted { "v" } else { "" };
				let i = if *case_insensitive { "i" } else { "" };
				serializer.collect_str(&format_args!("/{pattern}/{v}{i}"))
			}
		}
	}
}

impl<'de> Deserialize<'de> for Match {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_str(MatchVis)
	}
}

struct MatchVis;

impl Visitor<'_> for MatchVis {
	type Value = Match;

	fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("a valid matcher")
	}

	fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
		if let Some(regex_opts) = parse_regex(v) {
			let regex_opts = regex_opts.map_err(serde::de::Error::custom)?;

			// validate the bare pattern first, so that something like /)(/
			// can't sneak through the anchoring group below
			if let Err(err) = regex_syntax::parse(regex_opts.pattern) {
				return Err(serde::de::Error::custom(err));
			}

			// anchor the regex, so it is a full match like plain matchers
			let regex = format!("^(?:{})$", regex_opts.pattern);
			let regex = RegexBuilder::new(&regex)
				.case_insensitive(regex_opts.case_insensitive)
				.build()
				.map_err(serde::de::Error::custom)?;

			Ok(Match::Regex {
				regex,
				inverted: regex_opts.inverted,
				case_insensitive: regex_opts.case_insensitive,
			})
		} else {
			let plain = Match::Plain(v.to_owned());
			Ok(plain)
		}
	}
}

#[derive(Debug, thiserror::Error)]
enum RegexError {
	#[error("duplicate regex flag {0:?}")]
	DuplicateFlag(char),
	#[error("unknown regex flag {0:?}")]
	UnknownFlag(char),
}

struct RegexOptions<'a> {
	/// regex body
	pattern: &'a str,
	// invert the regex match
	inverted: bool,
	/// make the regex match case-insensitive
	case_insensitive: bool,
}

fn parse_regex(v: &str) -> Option<Result<RegexOptions<'_>, RegexError>> {
	let v = v.strip_prefix('/')?;
	let (pattern, flags) = v.rsplit_once('/')?;

	let opts = RegexOptions {
		pattern,
		inverted: false,
		case_insensitive: false,
	};

	let opts = flags.chars().try_fold(opts, |mut opts, f| match f {
		'v' if opts.inverted => Err(RegexError::DuplicateFlag('v')),
		'v' => {
			opts.inverted = true;
			Ok(opts)
		}
		'i' if opts.case_insensitive => Err(RegexError::DuplicateFlag('i')),
		'i' => {
			opts.case_insensitive = true;
			Ok(opts)
		}
		c => Err(RegexError::UnknownFlag(c)),
	});

	Some(opts)
}

impl PartialEq for Match {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(
				Match::Regex {
					regex: r1,
					inverted: v1,
					case_insensitive: i1,
				},
				Match::Regex {
					regex: r2,
					inverted: v2,
					case_insensitive: i2,
				},
			) => r1.as_str() == r2.as_str() && v1 == v2 && i1 == i2,
			(Match::Plain(p1), Match::Plain(p2)) => p1 == p2,
			_ => false,
		}
	}
}

impl Eq for Match {}

#[cfg(test)]
mod tests {
	use super::{Match, Placement, WindowRule, WindowRules};
	use crate::tags::TagMask;
	use pretty_assertions::assert_eq;

	fn matcher(s: &str) -> Match {
		serde_json::from_value(serde_json::Value::String(s.to_owned())).unwrap()
	}

	fn rule(class: Option<&str>, instance: Option<&str>, title: Option<&str>, tags: TagMask) -> WindowRule {
		WindowRule {
			class: class.map(matcher),
			instance: instance.map(matcher),
			title: title.map(matcher),
			tags,
			floating: false,
			monitor: None,
		}
	}

	#[test]
	fn wildcard_rule_matches_everything() {
		let rules = WindowRules::new(vec![rule(None, None, None, TagMask::tag(3))]);

		assert!(rules.resolve(None, None, None).is_some());
		assert!(rules.resolve(Some("st"), Some("st"), Some("zsh")).is_some());
	}

	#[test]
	fn class_rule_ignores_title() {
		let rules = WindowRules::default();

		let gimp = rules.resolve(Some("Gimp"), Some("gimp"), Some("GNU Image Manipulation Program"));
		assert!(gimp.unwrap().floating);

		let gimp = rules.resolve(Some("Gimp"), None, None);
		assert!(gimp.unwrap().floating);

		let firefox = rules.resolve(Some("Firefox"), Some("Navigator"), Some("anything"));
		assert_eq!(firefox.unwrap().tags, TagMask::tag(8));

		assert_eq!(rules.resolve(Some("gimp"), None, None), None);
		assert_eq!(rules.resolve(None, None, Some("Gimp")), None);
	}

	#[test]
	fn all_fields_must_match() {
		let rules = WindowRules::new(vec![rule(Some("st"), Some("scratch"), None, TagMask::tag(1))]);

		assert!(rules.resolve(Some("st"), Some("scratch"), None).is_some());
		assert!(rules.resolve(Some("st"), Some("other"), None).is_none());
		assert!(rules.resolve(Some("st"), None, None).is_none());
	}

	#[test]
	fn first_match_wins() {
		let rules = WindowRules::new(vec![
			rule(Some("st"), None, None, TagMask::tag(1)),
			rule(None, None, None, TagMask::tag(2)),
		]);

		assert_eq!(rules.resolve(Some("st"), None, None).unwrap().tags, TagMask::tag(1));
		assert_eq!(rules.resolve(Some("xterm"), None, None).unwrap().tags, TagMask::tag(2));
	}

	#[test]
	fn regex_matcher() {
		let rules = WindowRules::new(vec![
			rule(None, None, Some("/.*youtube.*/i"), TagMask::tag(4)),
			rule(Some("/st|xterm/v"), None, None, TagMask::tag(5)),
		]);

		let yt = rules.resolve(Some("st"), None, Some("YouTube - Firefox"));
		assert_eq!(yt.unwrap().tags, TagMask::tag(4));

		let not_term = rules.resolve(Some("pcmanfm"), None, None);
		assert_eq!(not_term.unwrap().tags, TagMask::tag(5));

		assert!(rules.resolve(Some("xterm"), None, None).is_none());
		// anchored, so a partial match doesn't count
		assert!(rules.resolve(Some("xterm"), None, Some("not youtub")).is_none());
	}

	#[test]
	fn regex_flags() {
		let err = serde_json::from_str::<Match>(r#""/a/ii""#).unwrap_err();
		assert!(err.to_string().contains("duplicate regex flag 'i'"));

		let err = serde_json::from_str::<Match>(r#""/a/x""#).unwrap_err();
		assert!(err.to_string().contains("unknown regex flag 'x'"));

		assert!(serde_json::from_str::<Match>(r#""/)(/""#).is_err());

		// a single slash is no regex
		assert_eq!(matcher("/usr"), Match::Plain("/usr".to_owned()));
	}

	#[test]
	fn serialize_regex() {
		let json = serde_json::to_string(&matcher("/fire.*/vi")).unwrap();
		assert_eq!(json, r#""/fire.*/vi""#);
	}

	#[test]
	fn placement() {
		let rules = WindowRules::default();
		let view = TagMask::tag(0);
		let all = TagMask::new(0b1_1111_1111);

		let firefox = rules.apply(Some("Firefox"), None, None, view, all);
		assert_eq!(
			firefox,
			Placement {
				tags: TagMask::tag(8),
				floating: false,
				monitor: None
			}
		);

		// rule without tags keeps the current view
		let gimp = rules.apply(Some("Gimp"), None, None, view, all);
		assert_eq!(gimp.tags, view);
		assert!(gimp.floating);

		let unmatched = rules.apply(Some("st"), None, None, view, all);
		assert_eq!(
			unmatched,
			Placement {
				tags: view,
				floating: false,
				monitor: None
			}
		);

		// tags beyond the configured ones fall back to the view
		let few = TagMask::new(0b1111);
		assert_eq!(rules.apply(Some("Firefox"), None, None, view, few).tags, view);
	}
}
