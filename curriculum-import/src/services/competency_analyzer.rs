//! Competency analysis of a program's disciplines
//!
//! Each discipline name is matched against ordered keyword patterns per
//! competency area. Within an area the first hit counts; across areas there
//! is no short-circuit, so one discipline may add its full credit to several
//! areas. Its credit enters the denominator once if anything matched.

use curriculum_common::db::ProgramDisciplineDetail;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::models::analysis::{CompetencyAnalysis, CompetencyArea};

/// Patterns per area, matched against the lower-cased discipline name
const PATTERN_TABLE: &[(CompetencyArea, &[&str])] = &[
    (
        CompetencyArea::ComputerEngineering,
        &[
            "схемотехник",
            "электроник",
            "физик",
            "робототехник",
            "микропроцессор",
            "архитектура эвм",
            "аппаратн",
            "железо",
            "интернет вещей",
            "iot",
            "сигналов",
        ],
    ),
    (
        CompetencyArea::ComputerScience,
        &[
            "алгоритм",
            "структур.*данных",
            "математик",
            "логик",
            "теори",
            "искусствен.*интеллект",
            "машинн.*обучени",
            "нейронн.*сет",
            "computer science",
            "дискретн",
            "вычислительн",
        ],
    ),
    (
        CompetencyArea::SoftwareEngineering,
        &[
            "разработк",
            "тестирован",
            "архитектура по",
            "управлени.*проект",
            "требовани",
            "devops",
            "quality",
            "качеств",
            "инженерия по",
            "software",
        ],
    ),
    (
        CompetencyArea::InformationTechnology,
        &[
            "сет",
            "администрирован",
            "операционн.*систем",
            "облачн",
            "инфраструктур",
            "linux",
            "windows",
            "сервер",
            "виртуализац",
        ],
    ),
    (
        CompetencyArea::InformationSystems,
        &[
            "бизнес",
            "процесс",
            "управлени.*предприяти",
            "erp",
            "crm",
            "1с",
            "экономик",
            "менеджмент",
            "маркетинг",
            "электронн.*коммерц",
        ],
    ),
    (
        CompetencyArea::Cybersecurity,
        &[
            "безопасн",
            "защит",
            "криптограф",
            "уязвимост",
            "атак",
            "security",
            "правовы.*аспект",
        ],
    ),
    (
        CompetencyArea::DataScience,
        &[
            // no bare "данн" stem: "структуры данных" stays CS only
            "обработк.*данн",
            "хранилищ.*данн",
            "больш.*данн",
            "анализ",
            "статистик",
            "big data",
            "аналитик",
            "визуализац",
            "data science",
        ],
    ),
];

static CATEGORY_PATTERNS: Lazy<Vec<(CompetencyArea, Vec<Regex>)>> = Lazy::new(|| {
    PATTERN_TABLE
        .iter()
        .map(|(area, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(p).expect("competency pattern must compile"))
                .collect();
            (*area, compiled)
        })
        .collect()
});

/// Parse a locale-formatted credit value
///
/// Comma and dot decimal separators are both accepted. Anything unparsable
/// or non-finite is `0.0`.
pub fn parse_zet(value: Option<&str>) -> f64 {
    value
        .map(|v| v.replace(',', "."))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Areas whose patterns match `name`, in table order
pub fn matching_areas(name: &str) -> Vec<CompetencyArea> {
    let lowered = name.to_lowercase();
    CATEGORY_PATTERNS
        .iter()
        .filter(|(_, patterns)| patterns.iter().any(|re| re.is_match(&lowered)))
        .map(|(area, _)| *area)
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Distribute the disciplines' credits across competency areas
pub fn analyze(disciplines: &[ProgramDisciplineDetail]) -> CompetencyAnalysis {
    let mut raw_scores: BTreeMap<CompetencyArea, f64> =
        CompetencyArea::ALL.iter().map(|area| (*area, 0.0)).collect();
    let mut total = 0.0;

    for discipline in disciplines {
        let credits = parse_zet(discipline.zet.as_deref());
        if credits <= 0.0 {
            continue;
        }

        let areas = matching_areas(&discipline.discipline);
        for area in &areas {
            *raw_scores.entry(*area).or_insert(0.0) += credits;
        }
        if !areas.is_empty() {
            total += credits;
        }
    }

    let scores = if total > 0.0 {
        raw_scores
            .iter()
            .map(|(area, sum)| (*area, round2(sum / total * 100.0)))
            .collect()
    } else {
        raw_scores.clone()
    };

    tracing::debug!(
        disciplines = disciplines.len(),
        total_analyzed_credits = total,
        "Competency analysis complete"
    );

    CompetencyAnalysis {
        scores,
        raw_scores,
        total_analyzed_credits: total,
    }
}
