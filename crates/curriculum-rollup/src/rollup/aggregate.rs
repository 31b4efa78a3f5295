use super::domain::{Entity, EntityKind, KpiKey, KpiMap};

/// Decimal places kept when a rolled-up value is stored.
pub const KPI_ROUNDING_DECIMALS: i32 = 4;

/// A value paired with its raw (not yet normalized) weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weighted {
    pub value: f64,
    pub weight: f64,
}

impl Weighted {
    pub fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }
}

/// Rounds to [`KPI_ROUNDING_DECIMALS`] places.
pub fn round_kpi(value: f64) -> f64 {
    let factor = 10f64.powi(KPI_ROUNDING_DECIMALS);
    (value * factor).round() / factor
}

/// Rescales weights so they sum to 1. Returns `None` when the total is not positive.
pub fn normalize_weights(weights: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = weights.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    Some(weights.iter().map(|weight| weight / total).collect())
}

/// `Σ(value·weight) / Σ(weight)` over the supplied pairs; `None` when the weights sum to zero.
///
/// Callers pass only the entries that produced a defined value, so a missing child never
/// reaches either the numerator or the denominator.
pub fn weighted_mean(entries: &[Weighted]) -> Option<f64> {
    let weights: Vec<f64> = entries.iter().map(|entry| entry.weight).collect();
    let normalized = normalize_weights(&weights)?;
    Some(
        entries
            .iter()
            .zip(normalized)
            .map(|(entry, share)| entry.value * share)
            .sum(),
    )
}

/// The KPI a parent produces and the child KPIs it reads, in preference order.
pub fn rollup_sources(kind: EntityKind) -> Option<(KpiKey, &'static [KpiKey])> {
    match kind {
        EntityKind::Assessment => Some((KpiKey::Proficiency, &[KpiKey::Proficiency])),
        EntityKind::Objective => Some((
            KpiKey::Alignment,
            &[KpiKey::Proficiency, KpiKey::Alignment],
        )),
        EntityKind::Course => Some((KpiKey::Completion, &[KpiKey::Alignment])),
        EntityKind::Standard => Some((
            KpiKey::Completion,
            &[KpiKey::Completion, KpiKey::Alignment],
        )),
        EntityKind::Item => None,
    }
}

fn pull(children: &[&Entity], source: KpiKey) -> Option<f64> {
    let entries: Vec<Weighted> = children
        .iter()
        .filter_map(|child| {
            child
                .computed_kpis
                .get(&source)
                .copied()
                .filter(|value| value.is_finite())
                .map(|value| Weighted::new(value, child.effective_weight()))
        })
        .collect();

    weighted_mean(&entries).map(round_kpi)
}

/// Rolls the children's computed KPIs up into the parent's KPI space.
///
/// Only keys that could actually be computed appear in the result; an empty map means the
/// parent has nothing to inherit from this set of children.
pub fn aggregate_child_kpis(kind: EntityKind, children: &[&Entity]) -> KpiMap {
    let mut kpis = KpiMap::new();
    let Some((target, sources)) = rollup_sources(kind) else {
        return kpis;
    };

    if let Some(value) = sources.iter().find_map(|source| pull(children, *source)) {
        kpis.insert(target, value);
    }
    kpis
}
