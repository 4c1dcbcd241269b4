use time::macros::date;

use weekboard::board::form::{self, TaskForm};
use weekboard::board::{Board, Priority, TaskDraft, TaskPatch};
use weekboard::calendar::Calendar;
use weekboard::catalog::{Catalog, TypeFlag};
use weekboard::comments::CommentThread;
use weekboard::config::Config;
use weekboard::store::{self, FileStore, Storage};

fn draft(title: &str, due: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_owned(),
        due_date: due.to_owned(),
        ..TaskDraft::default()
    }
}

#[test]
fn board_survives_reopen_from_data_dir() {
    let td = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(td.path().join("data"));
    let cfg = Config::default();

    let first_id = {
        let mut board =
            Board::load_or_seed(&store, &cfg.board.default_columns).expect("seed board");
        let new_col = board.columns()[0].id.clone();
        let task = board
            .add_task(
                &new_col,
                TaskDraft {
                    priority: Priority::High,
                    estimated_time_hours: Some(1.5),
                    ..draft("Write report", "2024-06-03")
                },
            )
            .expect("add task");
        board.add_task(&new_col, draft("Call vendor", "2024-06-05")).expect("add task");
        task.id
    };
    assert!(td.path().join("data").join("kanbanBoard.json").exists());

    let board = Board::load_or_seed(&store, &["Ignored".to_owned()]).expect("reopen");
    let titles: Vec<_> = board.columns().iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, ["New", "Scheduled", "In Progress", "Completed"]);
    let (column, task) = board.find_task(&first_id).expect("task persisted");
    assert_eq!(column.title, "New");
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.estimated_time_hours, Some(1.5));
    assert_eq!(board.columns()[0].tasks[1].title, "Call vendor");
}

#[test]
fn calendar_move_is_visible_to_the_board() {
    let td = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(td.path().to_path_buf());
    let mut board =
        Board::load_or_seed(&store, &["Todo".to_owned(), "Done".to_owned()]).expect("seed");
    let todo = board.columns()[0].id.clone();
    let scheduled = board
        .add_task(
            &todo,
            TaskDraft {
                schedule_date: Some("2024-06-04".to_owned()),
                ..draft("Standup", "2024-06-10")
            },
        )
        .expect("add");
    let due_only = board.add_task(&todo, draft("Report", "2024-06-05")).expect("add");

    let mut cal = Calendar::new(&store, date!(2024 - 06 - 05)).expect("calendar");
    assert_eq!(cal.week_start(), date!(2024 - 06 - 03));
    assert_eq!(cal.day(1)[0].id, scheduled.id);
    assert_eq!(cal.day(2)[0].id, due_only.id);

    assert!(cal.move_task(&scheduled.id, 4).expect("move"));
    assert!(cal.move_task(&due_only.id, 0).expect("move"));
    assert!(!cal.move_task("missing", 0).expect("move"));

    board.reload().expect("reload");
    let (_, moved) = board.find_task(&scheduled.id).expect("still on board");
    assert_eq!(moved.schedule_date.as_deref(), Some("2024-06-07"));
    assert_eq!(moved.due_date, "2024-06-10");
    let (_, moved) = board.find_task(&due_only.id).expect("still on board");
    assert_eq!(moved.due_date, "2024-06-03");
    assert_eq!(moved.schedule_date, None);

    // Column moves on the board do not change the calendar placement.
    let done = board.columns()[1].id.clone();
    board
        .update_task(
            &due_only.id,
            &TaskPatch {
                column_id: Some(done),
                ..TaskPatch::default()
            },
        )
        .expect("update");
    cal.refresh().expect("refresh");
    assert_eq!(cal.day(0)[0].id, due_only.id);
    assert_eq!(cal.day(4)[0].id, scheduled.id);
}

#[test]
fn transfer_keeps_every_task_exactly_once() {
    let td = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(td.path().to_path_buf());
    let mut board = Board::load_or_seed(&store, &["A".to_owned(), "B".to_owned()]).expect("seed");
    let a = board.columns()[0].id.clone();
    let b = board.columns()[1].id.clone();
    for i in 0..4 {
        board.add_task(&a, draft(&format!("task {i}"), "2024-06-03")).expect("add");
    }
    let mut before: Vec<String> = board.tasks().map(|t| t.id.clone()).collect();

    assert_eq!(board.transfer(&a, &b, 1, 0).expect("transfer"), Some(0));
    assert_eq!(board.transfer(&a, &b, 0, 99).expect("transfer"), Some(1));
    assert_eq!(board.transfer(&b, &b, 0, 1).expect("reorder"), Some(1));

    let reopened = Board::load(&store).expect("load");
    let mut after: Vec<String> = reopened.tasks().map(|t| t.id.clone()).collect();
    before.sort();
    after.sort();
    assert_eq!(before, after);
    assert_eq!(reopened.columns()[0].tasks.len(), 2);
    assert_eq!(reopened.columns()[1].tasks[0].title, "task 0");
    assert_eq!(reopened.columns()[1].tasks[1].title, "task 1");
}

#[test]
fn catalog_and_comments_are_stored_beside_the_board() {
    let td = tempfile::tempdir().expect("tempdir");
    let store = FileStore::new(td.path().to_path_buf());

    let mut catalog = Catalog::load(&store).expect("catalog");
    assert!(catalog.set_flag("meeting", TypeFlag::ForTasks, false));
    assert!(catalog.rename("review", "Code review"));
    catalog.save(&store).expect("save catalog");

    let catalog = Catalog::load(&store).expect("reload catalog");
    assert!(catalog.list_eligible(true).all(|t| t.id != "meeting"));
    assert!(catalog.list_eligible(false).any(|t| t.id == "meeting"));
    assert_eq!(catalog.resolve(Some("review")).name, "Code review");
    assert_eq!(catalog.resolve(Some("gone")).id, "operational");

    let mut thread = CommentThread::load(&store, "t1").expect("thread");
    let c = thread.add("looks good", "Ana Lima").expect("add comment");
    thread.toggle_like(&c.id).expect("like");
    let reread = CommentThread::load(&store, "t1").expect("thread");
    assert_eq!(reread.comments()[0].likes, 1);
    assert!(store.read(&store::comments_key("t1")).expect("read").is_some());
}

#[test]
fn form_validation_gates_new_tasks() {
    let today = date!(2024 - 06 - 03);
    let form = TaskForm {
        title: "ab".to_owned(),
        description: "short".to_owned(),
        due_date: "2024-06-01".to_owned(),
        estimated_time_hours: Some(0.0),
        ..TaskForm::default()
    };
    let errors = form::validate(&form, today).expect_err("invalid form");
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(
        fields,
        ["title", "description", "due_date", "estimated_time_hours"]
    );

    let form = TaskForm {
        title: "Plan sprint".to_owned(),
        due_date: "2024-06-03".to_owned(),
        assignee: "  ".to_owned(),
        ..TaskForm::default()
    };
    let draft = form::validate(&form, today).expect("valid form");
    assert_eq!(draft.assignee, None);
    assert_eq!(draft.priority, Priority::Medium);
}
