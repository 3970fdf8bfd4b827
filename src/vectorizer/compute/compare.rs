use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

use num::ToPrimitive;

/// コサイン類似度
/// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
///
/// Computed over the union of keys; a key missing from one map contributes
/// nothing to the dot product or to that map's norm. Returns 0 when either
/// map is empty (zero norm).
///
/// Both maps are walked in ascending key order, so the result does not
/// depend on hash iteration order: `cos(a, b) == cos(b, a)` bit for bit and
/// `cos(a, a) == 1.0` exactly.
pub fn cosine_similarity<K, N, S>(a: &HashMap<K, N, S>, b: &HashMap<K, N, S>) -> f64
where
    K: Ord + Hash,
    N: ToPrimitive + Copy,
    S: BuildHasher,
{
    cosine_similarity_sorted(sorted_entries(a).into_iter(), sorted_entries(b).into_iter())
}

/// コサイン類似度 over two iterators sorted by ascending key.
pub fn cosine_similarity_sorted<K>(
    vec: impl Iterator<Item = (K, f64)>,
    other: impl Iterator<Item = (K, f64)>,
) -> f64
where
    K: Ord,
{
    let mut a_it = vec.fuse();
    let mut b_it = other.fuse();
    let mut a_next = a_it.next();
    let mut b_next = b_it.next();
    let mut norm_a = 0_f64;
    let mut norm_b = 0_f64;
    let mut dot = 0_f64;
    loop {
        match (a_next.take(), b_next.take()) {
            (Some((ia, va)), Some((ib, vb))) => match ia.cmp(&ib) {
                Ordering::Equal => {
                    norm_a += va * va;
                    norm_b += vb * vb;
                    dot += va * vb;
                    a_next = a_it.next();
                    b_next = b_it.next();
                }
                Ordering::Less => {
                    norm_a += va * va;
                    a_next = a_it.next();
                    b_next = Some((ib, vb));
                }
                Ordering::Greater => {
                    norm_b += vb * vb;
                    a_next = Some((ia, va));
                    b_next = b_it.next();
                }
            },
            (Some((_, va)), None) => {
                norm_a += va * va;
                a_next = a_it.next();
            }
            (None, Some((_, vb))) => {
                norm_b += vb * vb;
                b_next = b_it.next();
            }
            (None, None) => break,
        }
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b).sqrt()
    }
}

/// ジャッカード係数
/// J(a, b) = |keys(a) ∩ keys(b)| / |keys(a) ∪ keys(b)|
///
/// Only term presence matters, counts are ignored. Returns 0 when both maps
/// are empty.
pub fn jaccard_similarity<K, N, S>(a: &HashMap<K, N, S>, b: &HashMap<K, N, S>) -> f64
where
    K: Eq + Hash,
    S: BuildHasher,
{
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.keys().filter(|key| large.contains_key(key)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

fn sorted_entries<K, N, S>(map: &HashMap<K, N, S>) -> Vec<(&K, f64)>
where
    K: Ord,
    N: ToPrimitive + Copy,
{
    let mut entries: Vec<(&K, f64)> = map
        .iter()
        .map(|(key, value)| (key, value.to_f64().unwrap_or(0.0)))
        .collect();
    entries.sort_unstable_by(|x, y| x.0.cmp(y.0));
    entries
}
