//! Monotonic temporary-filename generator (spec.md §6).

use std::sync::atomic::{AtomicU64, Ordering};

/// Produces names of the form `{path}{counter}{suffix}`, counter starting at
/// `initial_value` and incrementing once per call to [`FilenameGenerator::next`].
///
/// Distinct generators are not coordinated with each other; callers sharing a
/// directory between multiple generators are responsible for giving them
/// disjoint `initial_value`/stride ranges, as spec.md §6 documents.
#[derive(Debug)]
pub struct FilenameGenerator {
    path: String,
    suffix: String,
    counter: AtomicU64,
}

impl FilenameGenerator {
    /// Build a generator rooted at `path`, appending `suffix` to every name,
    /// starting the counter at `initial_value`.
    pub fn new(path: impl Into<String>, initial_value: u64, suffix: impl Into<String>) -> Self {
        FilenameGenerator {
            path: path.into(),
            suffix: suffix.into(),
            counter: AtomicU64::new(initial_value),
        }
    }

    /// Allocate and return the next name in the sequence.
    pub fn next(&self) -> String {
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}{}", self.path, counter, self.suffix)
    }
}

impl Clone for FilenameGenerator {
    fn clone(&self) -> Self {
        FilenameGenerator {
            path: self.path.clone(),
            suffix: self.suffix.clone(),
            counter: AtomicU64::new(self.counter.load(Ordering::Relaxed)),
        }
    }
}

impl Default for FilenameGenerator {
    fn default() -> Self {
        FilenameGenerator::new(std::env::temp_dir().to_string_lossy().into_owned() + "/apfloat", 0, ".tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_and_disjoint_from_start() {
        let gen = FilenameGenerator::new("/tmp/apf", 5, ".tmp");
        assert_eq!(gen.next(), "/tmp/apf5.tmp");
        assert_eq!(gen.next(), "/tmp/apf6.tmp");
        assert_eq!(gen.next(), "/tmp/apf7.tmp");
    }

    #[quickcheck_macros::quickcheck]
    fn counter_strictly_increases(initial: u64, calls: u8) -> bool {
        let gen = FilenameGenerator::new("p", initial, "s");
        let mut last = None;
        for _ in 0..calls {
            let name = gen.next();
            let counter: u64 = name
                .trim_start_matches('p')
                .trim_end_matches('s')
                .parse()
                .unwrap();
            if let Some(prev) = last {
                if counter != prev + 1 {
                    return false;
                }
            }
            last = Some(counter);
        }
        true
    }
}
