//! Canonical form for location paths.
//!
//! A path is a `/`-separated list of location names. Normalizing trims every
//! segment and drops the empty ones, which collapses repeated separators and
//! strips trailing ones. A single leading separator survives when something
//! follows it.

/// Separator between location names in a path.
pub const SEPARATOR: char = '/';

/// Returns the canonical form of `path`. Idempotent; `""` maps to `""`.
pub fn normalize(path: &str) -> String {
	let rooted = path.trim_start().starts_with(SEPARATOR);
	let body = path
		.split(SEPARATOR)
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join("/");

	if rooted && !body.is_empty() {
		format!("{SEPARATOR}{body}")
	} else {
		body
	}
}

/// Appends `key` to `parent` and normalizes the result.
pub fn join(parent: &str, key: &str) -> String {
	if parent.is_empty() {
		normalize(key)
	} else {
		normalize(&format!("{parent}{SEPARATOR}{key}"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn trims_segments_and_collapses_separators() {
		assert_eq!(normalize(" Shelf A // Bin 1 /"), "Shelf A/Bin 1");
		assert_eq!(normalize("a///b"), "a/b");
		assert_eq!(normalize("a/ /b"), "a/b");
	}

	#[test]
	fn strips_trailing_separators() {
		assert_eq!(normalize("Shelf A/"), "Shelf A");
		assert_eq!(normalize("Shelf A///"), "Shelf A");
		assert_eq!(normalize("Shelf A / "), "Shelf A");
	}

	#[test]
	fn keeps_a_single_leading_separator() {
		assert_eq!(normalize("/Shelf A"), "/Shelf A");
		assert_eq!(normalize("///Shelf A"), "/Shelf A");
		assert_eq!(normalize("  /Shelf A"), "/Shelf A");
	}

	#[test]
	fn degenerate_inputs_are_empty() {
		assert_eq!(normalize(""), "");
		assert_eq!(normalize("   "), "");
		assert_eq!(normalize("/"), "");
		assert_eq!(normalize("// / "), "");
	}

	#[test]
	fn normalization_is_idempotent() {
		let cases = [
			"",
			"/",
			"a",
			" a ",
			"a/b",
			"a//b/",
			"/a/ b /c//",
			"  / x",
			"x /",
			"Shelf A/Bin 1",
			"\tShelf\t/\tBin\t",
			"///",
		];
		for case in cases {
			let once = normalize(case);
			assert_eq!(normalize(&once), once, "input {case:?}");
		}
	}

	#[test]
	fn join_skips_separator_at_root() {
		assert_eq!(join("", "Shelf A"), "Shelf A");
		assert_eq!(join("Shelf A", "Bin 1"), "Shelf A/Bin 1");
		assert_eq!(join("Shelf A", " Bin 1/ "), "Shelf A/Bin 1");
		assert_eq!(join("Shelf A", ""), "Shelf A");
	}
}
