use program_core::model::{DayLesson, Enrollment, Program, ProgramId};
use program_core::progress::ProgressSnapshot;
use serde::Serialize;
use serde_json::json;

/// Renders command results as text or JSON on stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    pub fn programs<'a>(&self, programs: impl Iterator<Item = &'a Program>) -> anyhow::Result<()> {
        if self.json {
            let rows: Vec<_> = programs
                .map(|p| {
                    json!({
                        "id": p.id(),
                        "title": p.title(),
                        "description": p.description(),
                        "total_weeks": p.total_weeks(),
                        "total_days": p.total_days(),
                    })
                })
                .collect();
            return Self::emit(&rows);
        }
        for program in programs {
            println!(
                "{:<24} {} ({} weeks)",
                program.id(),
                program.title(),
                program.total_weeks()
            );
        }
        Ok(())
    }

    pub fn lesson(&self, program: &ProgramId, week: u32, lesson: &DayLesson) -> anyhow::Result<()> {
        if self.json {
            return Self::emit(&json!({
                "program_id": program,
                "week": week,
                "lesson": lesson,
            }));
        }
        println!("{program} · week {week}, day {}", lesson.day_number());
        println!("{}", lesson.title());
        println!();
        println!("{}", lesson.body());
        if let Some(exercise) = lesson.exercise() {
            println!();
            println!("Exercise: {exercise}");
        }
        Ok(())
    }

    pub fn enrolled(&self, enrollment: &Enrollment) -> anyhow::Result<()> {
        if self.json {
            return Self::emit(enrollment);
        }
        println!(
            "enrolled in {} (enrollment {}), starting at week {}",
            enrollment.program_id(),
            enrollment.id(),
            enrollment.current_week()
        );
        Ok(())
    }

    pub fn completed(
        &self,
        enrollment: &Enrollment,
        week: u32,
        day: u8,
        snapshot: &ProgressSnapshot,
    ) -> anyhow::Result<()> {
        if self.json {
            return Self::emit(&json!({
                "enrollment": enrollment,
                "progress": snapshot,
            }));
        }
        println!("completed week {week}, day {day}");
        self.snapshot(snapshot)
    }

    pub fn snapshot(&self, snapshot: &ProgressSnapshot) -> anyhow::Result<()> {
        if self.json {
            return Self::emit(snapshot);
        }
        println!(
            "{} [{}]: week {}/{}, {}/{} days ({:.0}%){}",
            snapshot.program_title,
            snapshot.program_id,
            snapshot.current_week,
            snapshot.total_weeks,
            snapshot.completed_days,
            snapshot.total_days,
            snapshot.percent,
            if snapshot.program_complete { ", complete" } else { "" }
        );
        for week in &snapshot.weeks {
            let marker = match (week.complete, week.accessible) {
                (true, _) => "done",
                (false, true) => "open",
                (false, false) => "locked",
            };
            let current = if week.is_current { "  <- current" } else { "" };
            println!(
                "  week {:>2} {:<7} {}/7  {}{current}",
                week.week_number,
                marker,
                week.completed_days.len(),
                week.title
            );
        }
        if let Some(current) = snapshot.current().filter(|_| !snapshot.program_complete) {
            println!("  next: week {}, day {}", current.week_number, current.next_day);
        }
        Ok(())
    }

    pub fn dashboard(&self, snapshots: &[ProgressSnapshot]) -> anyhow::Result<()> {
        if self.json {
            return Self::emit(snapshots);
        }
        if snapshots.is_empty() {
            println!("not enrolled in any program");
            return Ok(());
        }
        for snapshot in snapshots {
            self.snapshot(snapshot)?;
        }
        Ok(())
    }
}
