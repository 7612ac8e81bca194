//! Competency analysis results

use curriculum_common::db::ProgramSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Competency area a discipline can contribute credit to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompetencyArea {
    #[serde(rename = "CE")]
    ComputerEngineering,
    #[serde(rename = "CS")]
    ComputerScience,
    #[serde(rename = "SE")]
    SoftwareEngineering,
    #[serde(rename = "IT")]
    InformationTechnology,
    #[serde(rename = "IS")]
    InformationSystems,
    #[serde(rename = "CSEC")]
    Cybersecurity,
    #[serde(rename = "DS")]
    DataScience,
}

impl CompetencyArea {
    pub const ALL: [CompetencyArea; 7] = [
        CompetencyArea::ComputerEngineering,
        CompetencyArea::ComputerScience,
        CompetencyArea::SoftwareEngineering,
        CompetencyArea::InformationTechnology,
        CompetencyArea::InformationSystems,
        CompetencyArea::Cybersecurity,
        CompetencyArea::DataScience,
    ];

    /// Short code used in reports
    pub fn code(self) -> &'static str {
        match self {
            CompetencyArea::ComputerEngineering => "CE",
            CompetencyArea::ComputerScience => "CS",
            CompetencyArea::SoftwareEngineering => "SE",
            CompetencyArea::InformationTechnology => "IT",
            CompetencyArea::InformationSystems => "IS",
            CompetencyArea::Cybersecurity => "CSEC",
            CompetencyArea::DataScience => "DS",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CompetencyArea::ComputerEngineering => {
                "Computer Engineering (Компьютерная инженерия) - Аппаратное обеспечение, электроника, микропроцессоры."
            }
            CompetencyArea::ComputerScience => {
                "Computer Science (Компьютерные науки) - Алгоритмы, математика, искусственный интеллект, теория."
            }
            CompetencyArea::SoftwareEngineering => {
                "Software Engineering (Программная инженерия) - Разработка ПО, тестирование, управление проектами."
            }
            CompetencyArea::InformationTechnology => {
                "Information Technology (Информационные технологии) - Администрирование, сети, инфраструктура."
            }
            CompetencyArea::InformationSystems => {
                "Information Systems (Информационные системы) - Бизнес-процессы, управление предприятием, ERP/CRM."
            }
            CompetencyArea::Cybersecurity => {
                "Cybersecurity (Кибербезопасность) - Защита информации, криптография, безопасность сетей."
            }
            CompetencyArea::DataScience => {
                "Data Science (Наука о данных) - Анализ данных, статистика, машинное обучение."
            }
        }
    }

    /// Static legend attached to every report
    pub fn legend() -> BTreeMap<CompetencyArea, &'static str> {
        Self::ALL.iter().map(|area| (*area, area.description())).collect()
    }
}

impl fmt::Display for CompetencyArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Credit distribution of one program across competency areas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyAnalysis {
    /// Percent of analyzed credits per area, 2 decimals
    pub scores: BTreeMap<CompetencyArea, f64>,
    /// Summed credits per area
    pub raw_scores: BTreeMap<CompetencyArea, f64>,
    /// Credits of disciplines that matched at least one area
    pub total_analyzed_credits: f64,
}

impl CompetencyAnalysis {
    pub fn score(&self, area: CompetencyArea) -> f64 {
        self.scores.get(&area).copied().unwrap_or(0.0)
    }

    pub fn raw_score(&self, area: CompetencyArea) -> f64 {
        self.raw_scores.get(&area).copied().unwrap_or(0.0)
    }
}

/// Analysis of one program with its label and the area legend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyReport {
    pub program: ProgramSummary,
    pub analysis: CompetencyAnalysis,
    pub descriptions: BTreeMap<CompetencyArea, String>,
}

impl CompetencyReport {
    pub fn new(program: ProgramSummary, analysis: CompetencyAnalysis) -> Self {
        let descriptions = CompetencyArea::legend()
            .into_iter()
            .map(|(area, text)| (area, text.to_string()))
            .collect();
        Self {
            program,
            analysis,
            descriptions,
        }
    }
}
