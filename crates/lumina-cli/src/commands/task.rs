//! Task management commands for CLI.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use lumina_core::task::{NewTask, Task, TaskOwner, TaskSections, TaskType};
use lumina_core::TaskStore;

use super::{parse_day, today, Session};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Capture a new task
    Add {
        /// Task title
        title: String,
        /// Task type: foundation, routine, standard or deep-work
        #[arg(long = "type", default_value = "standard")]
        task_type: TaskType,
        /// Count this task toward the streak (ignored for foundation tasks)
        #[arg(long)]
        streak: bool,
        /// Due day, YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_day)]
        due: Option<NaiveDate>,
        /// Leave the task without a due day
        #[arg(long, conflicts_with = "due")]
        someday: bool,
        /// Owner: primary, partner or shared
        #[arg(long, default_value = "primary")]
        owner: TaskOwner,
        /// Area label
        #[arg(long)]
        area: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
    /// List tasks due on a day, grouped into foundation and regular
    List {
        /// Day to list, YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_day)]
        day: Option<NaiveDate>,
        /// Only show tasks in this area
        #[arg(long)]
        area: Option<String>,
    },
    /// Mark a task completed
    Done {
        /// Task ID
        id: String,
    },
    /// Mark a task not completed
    Undo {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let db = &session.db;

    match action {
        TaskAction::Add {
            title,
            task_type,
            streak,
            due,
            someday,
            owner,
            area,
            notes,
        } => {
            let due_date = if someday { None } else { Some(due.unwrap_or_else(today)) };
            let task = Task::capture(
                NewTask {
                    user_id: session.user_id().to_string(),
                    title,
                    task_type,
                    streak_required: streak,
                    due_date,
                    owner,
                    area,
                    notes,
                },
                Utc::now(),
            )?;
            db.insert_task(&task)?;
            tracing::debug!(id = %task.id, task_type = %task.task_type, "task captured");
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { day, area } => {
            let day = day.unwrap_or_else(today);
            let tasks = db.list_tasks(session.user_id(), day)?;
            let sections = TaskSections::split(&tasks, area.as_deref());
            let (done, total) = sections.foundation_progress();
            let output = serde_json::json!({
                "day": day,
                "foundation_progress": { "done": done, "total": total },
                "foundation": sections.foundation,
                "regular": sections.regular,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        TaskAction::Done { id } => {
            let task = db.update_completion(&id, true)?;
            println!("Completed: {}", task.title);
        }
        TaskAction::Undo { id } => {
            let task = db.update_completion(&id, false)?;
            println!("Reopened: {}", task.title);
        }
    }
    Ok(())
}
