use crc32fast::Hasher;
use std::collections::HashSet;

/// Derive an identifier seed from arbitrary input using CRC32
pub fn seed_from(input: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential identifier generator for schema nodes.
///
/// Identifiers are `<seed>-<count>`. Identifiers registered through
/// [`IdGenerator::reserve`] are never handed out, so a generator primed with
/// every identifier of a document only yields identifiers unique within it.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
    taken: HashSet<String>,
}

impl IdGenerator {
    pub fn new(seed_source: &str) -> Self {
        Self::from_seed(seed_from(seed_source))
    }

    pub fn from_seed(seed: String) -> Self {
        Self {
            seed,
            count: 0,
            taken: HashSet::new(),
        }
    }

    /// Mark identifiers as already in use
    pub fn reserve<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.taken.extend(ids.into_iter().map(Into::into));
    }

    /// Generate next unused identifier
    pub fn new_id(&mut self) -> String {
        loop {
            self.count += 1;
            let id = format!("{}-{}", self.seed, self.count);
            if self.taken.insert(id.clone()) {
                return id;
            }
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
