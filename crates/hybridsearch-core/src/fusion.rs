//! Weighted score fusion of keyword and vector result lists.

use std::cmp::Ordering;
use std::collections::HashMap;

use hybridsearch_config::HybridConfig;
use hybridsearch_protocols::ScoredItem;

/// Weights applied to each backend's scores before summing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionConfig {
    pub text_weight: f64,
    pub vector_weight: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            text_weight: 0.6,
            vector_weight: 0.4,
        }
    }
}

impl From<&HybridConfig> for FusionConfig {
    fn from(config: &HybridConfig) -> Self {
        Self {
            text_weight: config.text_weight,
            vector_weight: config.vector_weight,
        }
    }
}

/// Scores used for fusion, parallel to `items`.
///
/// A finite backend score is taken as is (zero included); an item without one
/// gets the rank-based fallback `1 - index / len`.
pub fn effective_scores(items: &[ScoredItem]) -> Vec<f64> {
    let len = items.len() as f64;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item.score {
            Some(score) if score.is_finite() => score,
            _ => 1.0 - index as f64 / len,
        })
        .collect()
}

struct Candidate {
    item: ScoredItem,
    score: f64,
    /// Position in each input list, `None` if absent from it.
    ranks: [Option<usize>; 2],
}

fn accumulate(lists: [(&[ScoredItem], f64); 2]) -> Vec<ScoredItem> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut candidates: Vec<Candidate> = Vec::new();

    for (list_no, (items, weight)) in lists.iter().enumerate() {
        let scores = effective_scores(items);
        for (rank, (item, score)) in items.iter().zip(scores).enumerate() {
            match index.get(item.id.as_str()) {
                Some(&at) => {
                    let candidate = &mut candidates[at];
                    // A repeated id within one list keeps its first position.
                    if candidate.ranks[list_no].is_some() {
                        continue;
                    }
                    candidate.score += score * weight;
                    candidate.ranks[list_no] = Some(rank);
                    for (field, fragments) in &item.highlights {
                        candidate
                            .item
                            .highlights
                            .entry(field.clone())
                            .or_insert_with(|| fragments.clone());
                    }
                    if candidate.item.source.is_none() {
                        candidate.item.source = item.source.clone();
                    }
                }
                None => {
                    let mut ranks = [None, None];
                    ranks[list_no] = Some(rank);
                    index.insert(item.id.as_str(), candidates.len());
                    candidates.push(Candidate {
                        item: item.clone(),
                        score: score * weight,
                        ranks,
                    });
                }
            }
        }
    }

    candidates.sort_by(compare_candidates);
    candidates
        .into_iter()
        .map(|mut c| {
            c.item.score = Some(c.score);
            c.item
        })
        .collect()
}

/// Fused score descending, then first-list rank, then second-list rank
/// (absent ranks last), then identifier.
fn compare_candidates(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| compare_rank(a.ranks[0], b.ranks[0]))
        .then_with(|| compare_rank(a.ranks[1], b.ranks[1]))
        .then_with(|| a.item.id.cmp(&b.item.id))
}

fn compare_rank(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Merge keyword and vector lists into one ranking without duplicates.
pub fn fuse(keyword: &[ScoredItem], vector: &[ScoredItem], config: &FusionConfig) -> Vec<ScoredItem> {
    accumulate([(keyword, config.text_weight), (vector, config.vector_weight)])
}

/// Rank a single backend's list with the same ordering rules as [`fuse`],
/// keeping its own (unweighted) scores.
pub fn rank_single(items: &[ScoredItem]) -> Vec<ScoredItem> {
    let none: &[ScoredItem] = &[];
    accumulate([(items, 1.0), (none, 0.0)])
}

/// The `limit` items of 1-based `page`.
pub fn paginate(items: Vec<ScoredItem>, page: u32, limit: u32) -> Vec<ScoredItem> {
    let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
    items.into_iter().skip(offset).take(limit as usize).collect()
}
