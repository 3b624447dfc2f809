//! Conversions from domain types to API types.

use attendance::{DaySummary, FailedAbsence, Mark, ReportMatrix, ScanOutcome, StudentRef};
use entities::{AttendanceEntry, AttendanceStatus, Course, Student};

/// Converts a course to its API form.
pub fn to_rpc_course(course: Course) -> rpc_protocol::Course {
    rpc_protocol::Course {
        id: course.id,
        name: course.name,
        group_name: course.group_name,
        school_year: course.school_year,
        teacher_id: course.teacher_id,
        time_zone: course.time_zone,
        created_at: course.created_at,
        updated_at: course.updated_at,
    }
}

/// Converts a student to its API form.
pub fn to_rpc_student(student: Student) -> rpc_protocol::Student {
    rpc_protocol::Student {
        id: student.id,
        name: student.name,
        course_id: student.course_id,
        created_at: student.created_at,
    }
}

fn to_rpc_status(status: AttendanceStatus) -> rpc_protocol::AttendanceStatus {
    match status {
        AttendanceStatus::Present => rpc_protocol::AttendanceStatus::Present,
        AttendanceStatus::Absent => rpc_protocol::AttendanceStatus::Absent,
    }
}

/// Converts an attendance entry to its API form.
pub fn to_rpc_entry(entry: AttendanceEntry) -> rpc_protocol::AttendanceEntry {
    rpc_protocol::AttendanceEntry {
        id: entry.id,
        student_id: entry.student_id,
        student_name: entry.student_name,
        course_id: entry.course_id,
        date: entry.date,
        timestamp: entry.timestamp,
        status: to_rpc_status(entry.status),
    }
}

/// Converts a scan outcome to its API form.
pub fn to_rpc_scan(outcome: ScanOutcome) -> rpc_protocol::ScanResult {
    use rpc_protocol::ScanResult;

    match outcome {
        ScanOutcome::Success { entry } => ScanResult::Success {
            entry: to_rpc_entry(entry),
        },
        ScanOutcome::AlreadyScanned {
            student_name,
            entry,
        } => ScanResult::AlreadyScanned {
            student_name,
            entry: to_rpc_entry(entry),
        },
        ScanOutcome::InvalidCode { raw_code } => ScanResult::InvalidCode { raw_code },
        ScanOutcome::NotInCourse { student_name } => ScanResult::NotInCourse { student_name },
        ScanOutcome::StorageError { message } => ScanResult::StorageError { message },
    }
}

pub fn to_rpc_failed(failed: FailedAbsence) -> rpc_protocol::FailedAbsence {
    rpc_protocol::FailedAbsence {
        student_id: failed.student_id,
        student_name: failed.student_name,
        error: failed.error,
    }
}

pub fn to_rpc_day(day: DaySummary) -> rpc_protocol::DaySummary {
    rpc_protocol::DaySummary {
        date: day.date,
        present_count: day.present_count,
        absent_count: day.absent_count,
    }
}

pub fn to_rpc_student_ref(student: StudentRef) -> rpc_protocol::StudentRef {
    rpc_protocol::StudentRef {
        student_id: student.student_id,
        name: student.name,
    }
}

fn to_rpc_mark(mark: Mark) -> rpc_protocol::Mark {
    match mark {
        Mark::Present => rpc_protocol::Mark::Present,
        Mark::Absent => rpc_protocol::Mark::Absent,
        Mark::NoRecord => rpc_protocol::Mark::NoRecord,
    }
}

/// Converts a report matrix to its API form.
pub fn to_rpc_report(matrix: ReportMatrix) -> rpc_protocol::MonthlyReport {
    let header = matrix.header;
    rpc_protocol::MonthlyReport {
        course_id: header.course_id,
        course_name: header.course_name,
        group_name: header.group_name,
        school_year: header.school_year,
        year_month: header.year_month.to_string(),
        days: matrix.days,
        rows: matrix
            .rows
            .into_iter()
            .map(|row| rpc_protocol::ReportRow {
                student_id: row.student_id,
                student_name: row.student_name,
                marks: row.marks.into_iter().map(to_rpc_mark).collect(),
                present_count: row.present_count,
                absent_count: row.absent_count,
            })
            .collect(),
    }
}
