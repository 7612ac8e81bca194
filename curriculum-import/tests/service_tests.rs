//! Integration tests for the caller-facing service
//!
//! Import through the service, then read back: listing with filters,
//! program detail, competency analysis, comparison and reset.

mod helpers;

use curriculum_import::db::ProgramFilter;
use curriculum_import::models::CompetencyArea;
use curriculum_import::{CurriculumService, ImportError, WorkbookSource};
use helpers::{count_rows, create_test_service, TestWorkbook};
use uuid::Uuid;

async fn import(service: &CurriculumService, workbook: TestWorkbook, year: Option<i32>) -> Uuid {
    service
        .import_program(WorkbookSource::from_bytes("plan.xlsx", workbook.to_bytes()), year)
        .await
        .unwrap()
        .program_id
}

fn security_program() -> TestWorkbook {
    TestWorkbook::new("Безопасность информационных систем")
        .discipline("Алгоритмы и структуры данных", "1", "Б1.О.01", "3")
        .discipline("Информационная безопасность", "2", "Б1.О.02", "2")
        .discipline("Физкультура", "1", "Б1.О.03", "1")
}

#[tokio::test]
async fn test_competency_analysis_of_imported_program() {
    let (_dir, service) = create_test_service().await;
    let id = import(&service, security_program(), Some(2023)).await;

    let report = service.get_competency_analysis(id).await.unwrap();

    assert_eq!(report.program.id, id);
    assert_eq!(report.program.direction_code.as_deref(), Some("09.03.04"));
    assert_eq!(report.analysis.total_analyzed_credits, 5.0);
    assert_eq!(report.analysis.score(CompetencyArea::ComputerScience), 60.0);
    assert_eq!(report.analysis.score(CompetencyArea::Cybersecurity), 40.0);
    assert_eq!(report.analysis.score(CompetencyArea::DataScience), 0.0);
    assert_eq!(report.descriptions.len(), CompetencyArea::ALL.len());
}

#[tokio::test]
async fn test_unknown_program_is_not_found() {
    let (_dir, service) = create_test_service().await;

    let err = service.get_competency_analysis(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ImportError::NotFound(_)));

    let err = service.program_detail(Uuid::new_v4()).await.unwrap_err();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_compare_keeps_request_order() {
    let (_dir, service) = create_test_service().await;
    let security = import(&service, security_program(), Some(2023)).await;
    let business = import(
        &service,
        TestWorkbook::new("Бизнес-информатика").discipline("Экономика предприятия", "1", "Б1.О.01", "4"),
        Some(2023),
    )
    .await;

    let reports = service.compare(&[business, security]).await.unwrap();

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].program.id, business);
    assert_eq!(reports[1].program.id, security);
    assert_eq!(reports[0].analysis.score(CompetencyArea::InformationSystems), 100.0);

    let err = service.compare(&[security, Uuid::new_v4()]).await.unwrap_err();
    assert!(matches!(err, ImportError::NotFound(_)));
}

#[tokio::test]
async fn test_program_detail_resolves_names() {
    let (_dir, service) = create_test_service().await;
    let id = import(&service, security_program(), Some(2023)).await;

    let detail = service.program_detail(id).await.unwrap();

    assert_eq!(detail.program.faculty.as_deref(), Some("Факультет информационных технологий"));
    assert_eq!(detail.program.year, Some(2023));
    let names: Vec<&str> = detail.disciplines.iter().map(|d| d.discipline.as_str()).collect();
    assert_eq!(
        names,
        vec!["Алгоритмы и структуры данных", "Информационная безопасность", "Физкультура"]
    );
    assert_eq!(detail.disciplines[0].semester.as_deref(), Some("1"));
    assert_eq!(detail.disciplines[0].load_type.as_deref(), Some("Лекционные занятия"));
    assert_eq!(detail.disciplines[0].zet.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_list_filters() {
    let (_dir, service) = create_test_service().await;
    import(&service, TestWorkbook::new("A"), Some(2022)).await;
    import(&service, TestWorkbook::new("B"), Some(2023)).await;
    import(
        &service,
        TestWorkbook::new("C")
            .with_meta("Факультет", "Институт кибербезопасности")
            .with_meta("Уровень образования", "Магистратура"),
        Some(2024),
    )
    .await;

    let all = service.list_programs(&ProgramFilter::default()).await.unwrap();
    let profiles: Vec<&str> = all.iter().map(|p| p.profile.as_str()).collect();
    assert_eq!(profiles, vec!["C", "B", "A"]);

    let by_year = ProgramFilter {
        year: Some(2023),
        ..Default::default()
    };
    assert_eq!(service.list_programs(&by_year).await.unwrap().len(), 1);

    let range = ProgramFilter {
        year_from: Some(2023),
        year_to: Some(2024),
        ..Default::default()
    };
    assert_eq!(service.list_programs(&range).await.unwrap().len(), 2);

    let faculty = ProgramFilter {
        faculty: Some("институт КИБЕРБЕЗОПАСНОСТИ".to_string()),
        ..Default::default()
    };
    let found = service.list_programs(&faculty).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].profile, "C");

    let level = ProgramFilter {
        education_level: Some("бакалавриат".to_string()),
        ..Default::default()
    };
    assert_eq!(service.list_programs(&level).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reset_removes_everything() {
    let (_dir, service) = create_test_service().await;
    import(&service, security_program(), Some(2023)).await;

    let summary = service.reset().await.unwrap();

    assert_eq!(summary.programs, 1);
    assert_eq!(summary.program_disciplines, 3);
    assert_eq!(summary.directions, 1);
    assert!(summary.dictionary_rows > 0);
    for table in ["programs", "program_disciplines", "directions", "discipline_catalog", "faculties"] {
        assert_eq!(count_rows(service.pool(), table).await, 0, "{table}");
    }

    // the store is usable again after a reset
    import(&service, security_program(), Some(2023)).await;
    assert_eq!(count_rows(service.pool(), "programs").await, 1);
}
