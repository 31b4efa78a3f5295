use super::domain::{EntityKind, KpiKey, KpiMap, RawData};

/// Clamps a finite number into `[0,1]`; anything else is treated as missing.
pub fn clamp_unit(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(0.0, 1.0))
}

/// Converts a 0..100 percentage into the `[0,1]` metric space, clamping out-of-range input.
pub fn pct_to_unit(pct: Option<f64>) -> Option<f64> {
    pct.and_then(|pct| clamp_unit(pct / 100.0))
}

/// KPIs an entity carries on its own, before anything is rolled up from its children.
pub fn extract_kpis(kind: EntityKind, data: &RawData) -> KpiMap {
    let mut kpis = KpiMap::new();

    let extracted = match kind {
        EntityKind::Item => pct_to_unit(data.average_pct.or(data.difficulty_pct))
            .map(|value| (KpiKey::Proficiency, value)),
        EntityKind::Assessment => {
            pct_to_unit(data.average_pct).map(|value| (KpiKey::Proficiency, value))
        }
        EntityKind::Objective => {
            pct_to_unit(data.achievement_pct).map(|value| (KpiKey::Alignment, value))
        }
        EntityKind::Course => {
            pct_to_unit(data.course_avg_pct).map(|value| (KpiKey::Completion, value))
        }
        // Standards only derive from their courses; freshness stays reserved.
        EntityKind::Standard => None,
    };

    if let Some((key, value)) = extracted {
        kpis.insert(key, value);
    }
    kpis
}
