use agconf_core::document::{self, DEFAULT_DOCUMENT};
use agconf_core::Semester;
use agconf_renderer::{materialize_suite, Renderer, ScaffoldContext};
use rstest::rstest;
use tempfile::TempDir;

fn render(project: &str, course: &str, semester: Semester, year: u32) -> String {
    let renderer = Renderer::new().expect("renderer");
    renderer
        .render_document(&ScaffoldContext::new(project, course, semester, year))
        .expect("render")
}

#[rstest]
#[case("HW1", "EECS 280", Semester::Fall, 2024)]
#[case("Project: \"Two\"", "EECS 281 # honors", Semester::Summer, 2031)]
#[case("P3", "eecs490", Semester::Winter, 2025)]
fn scaffold_parses_back_with_same_identity(
    #[case] project: &str,
    #[case] course: &str,
    #[case] semester: Semester,
    #[case] year: u32,
) {
    let text = render(project, course, semester, year);
    let parsed = document::parse(&text).expect("scaffold is valid YAML");
    document::validate(&parsed).expect("scaffold validates");
    assert_eq!(parsed.project.name, project);
    assert_eq!(parsed.project.course.name, course);
    assert_eq!(parsed.project.course.semester, semester);
    assert_eq!(parsed.project.course.year, year);
}

#[test]
fn scaffold_repeat_example_expands() {
    let text = render("HW1", "EECS 280", Semester::Fall, 2024);
    let parsed = document::parse(&text).unwrap();
    let suite = &parsed.project.test_suites[0];
    let names: Vec<String> = materialize_suite(suite)
        .unwrap()
        .into_iter()
        .map(|case| case.name)
        .collect();
    assert_eq!(names, vec!["Test 1", "Test 2"]);
}

#[test]
fn scaffold_written_to_disk_loads() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join(DEFAULT_DOCUMENT);
    document::write_new_at(&path, &render("HW1", "EECS 280", Semester::Spring, 2026))
        .expect("write");
    let loaded = document::load_at(&path).expect("load");
    assert_eq!(loaded.project.course.semester, Semester::Spring);
    assert!(loaded.presets().commands.get("pass/fail").is_some());
}
