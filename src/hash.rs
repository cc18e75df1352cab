use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn stable_hash_with(f: impl FnOnce(&mut DefaultHasher)) -> u64 {
    let mut hasher = DefaultHasher::new();
    f(&mut hasher);
    hasher.finish()
}

pub fn stable_hash_slice<T: Hash>(seed: u64, values: &[T]) -> u64 {
    stable_hash_with(|hasher| {
        seed.hash(hasher);
        values.hash(hasher);
    })
}
