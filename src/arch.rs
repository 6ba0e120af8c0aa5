//! Native library architectures known to the patch engine.

/// Every architecture the engine can keep or strip.
pub const ARCHITECTURES: &[&str] = &["armeabi-v7a", "x86", "x86_64", "arm64-v8a"];

/// Architectures to strip for a build targeting `targets`.
///
/// Returns each known architecture not listed in `targets`, exactly once, in
/// [`ARCHITECTURES`] order. Unknown entries in `targets` are ignored.
pub fn strip_targets<S: AsRef<str>>(targets: &[S]) -> Vec<&'static str> {
    strip_targets_from(ARCHITECTURES, targets)
}

/// Same as [`strip_targets`] against an explicit architecture universe.
pub fn strip_targets_from<S: AsRef<str>>(
    universe: &[&'static str],
    targets: &[S],
) -> Vec<&'static str> {
    let mut stripped: Vec<&'static str> = Vec::new();
    for arch in universe {
        let targeted = targets.iter().any(|t| t.as_ref() == *arch);
        if !targeted && !stripped.contains(arch) {
            stripped.push(*arch);
        }
    }
    stripped
}
