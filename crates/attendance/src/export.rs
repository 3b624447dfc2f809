//! CSV rendering of monthly reports.

use std::fmt::Write;

use crate::ReportMatrix;

/// Quotes a field, doubling embedded quotes.
fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Suggested file name for an exported report, e.g. `Math_2024-11.csv`.
pub fn csv_file_name(matrix: &ReportMatrix) -> String {
    let name: String = matrix
        .header
        .course_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}.csv", name, matrix.header.year_month)
}

/// Renders the matrix as CSV.
///
/// Columns are `No.`, `Student` (always quoted), one column per day of the
/// month (ISO dates) holding `P`, `A` or `-`, then the `Present` and `Absent`
/// totals. Rows end with `\n`.
pub fn to_csv(matrix: &ReportMatrix) -> String {
    let mut out = String::from("No.,Student");
    for day in &matrix.days {
        let _ = write!(out, ",{}", day.format("%Y-%m-%d"));
    }
    out.push_str(",Present,Absent\n");

    for (index, row) in matrix.rows.iter().enumerate() {
        let _ = write!(out, "{},{}", index + 1, csv_quote(&row.student_name));
        for mark in &row.marks {
            out.push(',');
            out.push(mark.as_char());
        }
        let _ = writeln!(out, ",{},{}", row.present_count, row.absent_count);
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use entities::{AttendanceEntry, Course, Student, YearMonth};

    use super::*;
    use crate::{build_matrix, testing::at};

    fn matrix() -> ReportMatrix {
        let mut course = Course::new("Enfermería 1", "A", "2024-2025");
        course.id = "c1".to_string();
        let roster = vec![
            Student::new("s1", "Torres, Ana", "c1"),
            Student::new("s2", "Beto \"B\" Ruiz", "c1"),
        ];
        let t = at(2024, 2, 1, 15);
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let entries = vec![
            AttendanceEntry::present("s1", "Torres, Ana", "c1", feb, t),
            AttendanceEntry::absent("s2", "Beto", "c1", feb, t),
        ];
        let ym: YearMonth = "2024-02".parse().unwrap();
        build_matrix(&course, ym, &roster, &entries)
    }

    #[test]
    fn test_csv_header_and_rows() {
        let csv = to_csv(&matrix());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("No.,Student,2024-02-01,2024-02-02,"));
        assert!(lines[0].ends_with(",2024-02-29,Present,Absent"));

        // roster order is by name: "Beto..." before "Torres..."
        assert!(lines[1].starts_with("1,\"Beto \"\"B\"\" Ruiz\",A,-,"));
        assert!(lines[1].ends_with(",0,1"));
        assert!(lines[2].starts_with("2,\"Torres, Ana\",P,-,"));
        assert!(lines[2].ends_with(",1,0"));

        // 2 fixed + 29 days + 2 totals
        assert_eq!(lines[1].matches(',').count(), 32);
    }

    #[test]
    fn test_csv_empty_roster_has_only_header() {
        let mut course = Course::new("Math", "A", "2024-2025");
        course.id = "c1".to_string();
        let m = build_matrix(&course, "2024-11".parse().unwrap(), &[], &[]);

        assert_eq!(to_csv(&m).lines().count(), 1);
    }

    #[test]
    fn test_csv_file_name() {
        assert_eq!(csv_file_name(&matrix()), "Enfermería_1_2024-02.csv");
    }
}
