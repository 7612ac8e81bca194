//! Curriculum workbook fixtures
//!
//! Builds two-sheet workbooks in the layout the importer reads: a label →
//! value program sheet and a discipline table with the standard headers.

use rust_xlsxwriter::Workbook;
use std::path::Path;

const DISCIPLINE_HEADERS: [&str; 11] = [
    "Блок",
    "Шифр",
    "Часть",
    "Модуль",
    "Тип записи",
    "Дисциплина",
    "Период контроля",
    "Нагрузка",
    "Количество",
    "Ед. изм.",
    "ЗЕТ",
];

/// One discipline row; `None` cells are left empty
#[derive(Debug, Clone, Default)]
pub struct TestDiscipline {
    pub block: Option<String>,
    pub code: Option<String>,
    pub part: Option<String>,
    pub module: Option<String>,
    pub name: Option<String>,
    pub semester: Option<String>,
    pub load_type: Option<String>,
    pub amount: Option<String>,
    pub zet: Option<String>,
}

impl TestDiscipline {
    pub fn new(name: &str, semester: &str, code: &str, zet: &str) -> Self {
        Self {
            block: Some("Блок 1".to_string()),
            code: Some(code.to_string()),
            part: Some("Обязательная часть".to_string()),
            module: None,
            name: Some(name.to_string()),
            semester: Some(semester.to_string()),
            load_type: Some("Лекционные занятия".to_string()),
            amount: Some("36".to_string()),
            zet: Some(zet.to_string()),
        }
    }

    fn cells(&self) -> [Option<&str>; 11] {
        [
            self.block.as_deref(),
            self.code.as_deref(),
            self.part.as_deref(),
            self.module.as_deref(),
            Some("Дисциплина"),
            self.name.as_deref(),
            self.semester.as_deref(),
            self.load_type.as_deref(),
            self.amount.as_deref(),
            Some("Часы"),
            self.zet.as_deref(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct TestWorkbook {
    pub metadata: Vec<(String, String)>,
    pub disciplines: Vec<TestDiscipline>,
    /// Leave sheet 2 with no cells at all, header included
    pub blank_discipline_sheet: bool,
}

impl TestWorkbook {
    /// A bachelor program in software engineering with no disciplines
    pub fn new(profile: &str) -> Self {
        let metadata = [
            ("Номер АУП", "000012345"),
            ("Вид образования", "Высшее образование"),
            ("Уровень образования", "Бакалавриат"),
            ("Направление (специальность)", "09.03.04 Программная инженерия"),
            ("Квалификация", "Бакалавр"),
            ("Профиль (специализация)", profile),
            ("Тип стандарта", "ФГОС3++"),
            ("Факультет", "Факультет информационных технологий"),
        ]
        .into_iter()
        .map(|(label, value)| (label.to_string(), value.to_string()))
        .collect();

        Self {
            metadata,
            disciplines: Vec::new(),
            blank_discipline_sheet: false,
        }
    }

    /// Set (or add) a program sheet value
    pub fn with_meta(mut self, label: &str, value: &str) -> Self {
        match self.metadata.iter_mut().find(|(l, _)| l == label) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.metadata.push((label.to_string(), value.to_string())),
        }
        self
    }

    /// Drop a program sheet row entirely
    pub fn without_meta(mut self, label: &str) -> Self {
        self.metadata.retain(|(l, _)| l != label);
        self
    }

    pub fn with_blank_discipline_sheet(mut self) -> Self {
        self.blank_discipline_sheet = true;
        self
    }

    pub fn with_discipline(mut self, discipline: TestDiscipline) -> Self {
        self.disciplines.push(discipline);
        self
    }

    /// Shorthand for a discipline with default block/part/load type
    pub fn discipline(self, name: &str, semester: &str, code: &str, zet: &str) -> Self {
        self.with_discipline(TestDiscipline::new(name, semester, code, zet))
    }

    fn build(&self) -> Workbook {
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Лист1").unwrap();
        for (row, (label, value)) in self.metadata.iter().enumerate() {
            sheet.write_string(row as u32, 0, label).unwrap();
            sheet.write_string(row as u32, 1, value).unwrap();
        }

        let sheet = workbook.add_worksheet();
        sheet.set_name("Лист2").unwrap();
        if self.blank_discipline_sheet {
            return workbook;
        }
        for (col, header) in DISCIPLINE_HEADERS.iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        for (i, discipline) in self.disciplines.iter().enumerate() {
            let row = i as u32 + 1;
            for (col, cell) in discipline.cells().iter().enumerate() {
                if let Some(value) = cell {
                    sheet.write_string(row, col as u16, *value).unwrap();
                }
            }
        }

        workbook
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.build().save_to_buffer().unwrap()
    }

    pub fn save(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        self.build().save(path).unwrap();
    }
}
