use chrono::{Duration, NaiveDate};

use todo_tracker::{
    db::entities::todo::{self, Priority},
    services::todo_service::{NewTodo, TodoChanges, TodoCounts, TodoService},
    test_helpers::memory_services,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 10).expect("date should be valid")
}

async fn service() -> TodoService {
    let (_state, services) = memory_services().await.expect("in-memory database");
    services.todo()
}

async fn create(
    service: &TodoService,
    title: &str,
    due_date: Option<NaiveDate>,
    priority: Priority,
) -> todo::Model {
    service
        .create(NewTodo {
            title: title.to_string(),
            due_date,
            priority,
            ..NewTodo::default()
        })
        .await
        .expect("create todo")
}

fn ids(todos: &[todo::Model]) -> Vec<i32> {
    todos.iter().map(|todo| todo.id).collect()
}

#[tokio::test]
async fn create_applies_defaults() {
    let service = service().await;
    let todo = service
        .create(NewTodo::titled("  Test Todo  "))
        .await
        .expect("create todo");

    assert_eq!(todo.title, "Test Todo");
    assert_eq!(todo.priority, Priority::Medium);
    assert_eq!(todo.description, None);
    assert_eq!(todo.due_date, None);
    assert!(!todo.completed);
    assert!(!todo.cancelled);

    let loaded = service.get(todo.id).await.expect("get todo");
    assert_eq!(loaded.id, todo.id);
    assert_eq!(loaded.title, "Test Todo");
    assert_eq!(loaded.priority, Priority::Medium);
}

#[tokio::test]
async fn create_rejects_invalid_titles() {
    let service = service().await;

    let err = service
        .create(NewTodo::titled("   "))
        .await
        .expect_err("blank title should fail");
    assert!(err.is_validation());

    let err = service
        .create(NewTodo::titled("x".repeat(201)))
        .await
        .expect_err("long title should fail");
    assert!(err.is_validation());

    assert_eq!(service.count_all().await.expect("count"), 0);
}

#[tokio::test]
async fn blank_description_is_stored_as_none() {
    let service = service().await;
    let todo = service
        .create(NewTodo {
            title: "Write report".to_string(),
            description: Some("   ".to_string()),
            ..NewTodo::default()
        })
        .await
        .expect("create todo");
    assert_eq!(todo.description, None);
}

#[tokio::test]
async fn high_priority_due_today_is_active() {
    let service = service().await;
    let todo = create(&service, "Test Todo", Some(today()), Priority::High).await;

    assert_eq!(ids(&service.list_active(today()).await.expect("active")), [todo.id]);
    assert_eq!(
        ids(&service.list_by_priority(Priority::High).await.expect("by priority")),
        [todo.id]
    );
    assert!(service.list_expired(today()).await.expect("expired").is_empty());
}

#[tokio::test]
async fn past_due_todo_is_expired_not_active() {
    let service = service().await;
    let todo = create(
        &service,
        "Old",
        Some(today() - Duration::days(1)),
        Priority::Medium,
    )
    .await;

    assert_eq!(ids(&service.list_expired(today()).await.expect("expired")), [todo.id]);
    assert!(service.list_active(today()).await.expect("active").is_empty());

    // by-priority ignores the due date
    assert_eq!(
        ids(&service.list_by_priority(Priority::Medium).await.expect("by priority")),
        [todo.id]
    );
}

#[tokio::test]
async fn toggles_are_involutions() {
    let service = service().await;
    let todo = create(&service, "Flip me", None, Priority::Low).await;

    let resolved = service.toggle_resolved(todo.id).await.expect("resolve");
    assert!(resolved.completed);
    assert!(!resolved.cancelled);
    let reopened = service.toggle_resolved(todo.id).await.expect("reopen");
    assert!(!reopened.completed);

    let cancelled = service.toggle_cancelled(todo.id).await.expect("cancel");
    assert!(cancelled.cancelled);
    let restored = service.toggle_cancelled(todo.id).await.expect("restore");
    assert!(!restored.cancelled);

    let loaded = service.get(todo.id).await.expect("get todo");
    assert_eq!(loaded.title, todo.title);
    assert_eq!(loaded.due_date, todo.due_date);
    assert_eq!(loaded.priority, todo.priority);
    assert_eq!((loaded.completed, loaded.cancelled), (false, false));
}

#[tokio::test]
async fn toggling_missing_todo_is_not_found() {
    let service = service().await;
    assert!(
        service
            .toggle_resolved(404)
            .await
            .expect_err("missing todo")
            .is_not_found()
    );
    assert!(
        service
            .toggle_cancelled(404)
            .await
            .expect_err("missing todo")
            .is_not_found()
    );
}

#[tokio::test]
async fn completed_todos_leave_active_and_expired() {
    let service = service().await;
    let current = create(&service, "Current", Some(today()), Priority::Low).await;
    let overdue = create(
        &service,
        "Overdue",
        Some(today() - Duration::days(3)),
        Priority::Low,
    )
    .await;

    service.toggle_resolved(current.id).await.expect("resolve");
    service.toggle_resolved(overdue.id).await.expect("resolve");

    assert!(service.list_active(today()).await.expect("active").is_empty());
    assert!(service.list_expired(today()).await.expect("expired").is_empty());
    assert!(
        service
            .list_by_priority(Priority::Low)
            .await
            .expect("by priority")
            .is_empty()
    );
    assert_eq!(
        ids(&service.list_resolved().await.expect("resolved")),
        [overdue.id, current.id]
    );
}

#[tokio::test]
async fn cancelled_low_priority_todo_is_hidden_from_priority_list() {
    let service = service().await;
    let todo = create(&service, "Skip", None, Priority::Low).await;
    service.toggle_cancelled(todo.id).await.expect("cancel");

    assert!(
        service
            .list_by_priority(Priority::Low)
            .await
            .expect("by priority")
            .is_empty()
    );
    assert_eq!(ids(&service.list_cancelled().await.expect("cancelled")), [todo.id]);
}

#[tokio::test]
async fn todo_with_both_flags_appears_in_resolved_and_cancelled() {
    let service = service().await;
    let todo = create(&service, "Both", Some(today()), Priority::High).await;
    service.toggle_resolved(todo.id).await.expect("resolve");
    service.toggle_cancelled(todo.id).await.expect("cancel");

    assert_eq!(ids(&service.list_resolved().await.expect("resolved")), [todo.id]);
    assert_eq!(ids(&service.list_cancelled().await.expect("cancelled")), [todo.id]);
    assert!(service.list_active(today()).await.expect("active").is_empty());

    let counts = service.counts(today()).await.expect("counts");
    assert_eq!(
        counts,
        TodoCounts {
            active: 0,
            resolved: 1,
            cancelled: 1,
            expired: 0,
        }
    );
}

#[tokio::test]
async fn active_list_orders_by_due_date_then_priority_code() {
    let service = service().await;
    let tomorrow = today() + Duration::days(1);

    let undated_high = create(&service, "Undated high", None, Priority::High).await;
    let tomorrow_medium = create(&service, "Tomorrow medium", Some(tomorrow), Priority::Medium).await;
    let today_medium = create(&service, "Today medium", Some(today()), Priority::Medium).await;
    let today_low = create(&service, "Today low", Some(today()), Priority::Low).await;
    let today_high = create(&service, "Today high", Some(today()), Priority::High).await;
    let undated_low = create(&service, "Undated low", None, Priority::Low).await;

    let active = service.list_active(today()).await.expect("active");
    assert_eq!(
        ids(&active),
        [
            today_high.id,
            today_low.id,
            today_medium.id,
            tomorrow_medium.id,
            undated_high.id,
            undated_low.id,
        ]
    );
}

#[tokio::test]
async fn update_changes_only_given_fields() {
    let service = service().await;
    let todo = service
        .create(NewTodo {
            title: "Draft".to_string(),
            description: Some("first pass".to_string()),
            due_date: Some(today()),
            priority: Priority::Low,
            ..NewTodo::default()
        })
        .await
        .expect("create todo");

    let updated = service
        .update(
            todo.id,
            TodoChanges {
                title: Some(" Final ".to_string()),
                due_date: Some(None),
                ..TodoChanges::default()
            },
        )
        .await
        .expect("update todo");

    assert_eq!(updated.title, "Final");
    assert_eq!(updated.due_date, None);
    assert_eq!(updated.description.as_deref(), Some("first pass"));
    assert_eq!(updated.priority, Priority::Low);
}

#[tokio::test]
async fn update_setting_completed_moves_todo_to_resolved() {
    let service = service().await;
    let todo = create(&service, "Finish", Some(today()), Priority::Medium).await;

    service
        .update(
            todo.id,
            TodoChanges {
                completed: Some(true),
                ..TodoChanges::default()
            },
        )
        .await
        .expect("update todo");

    assert!(service.list_active(today()).await.expect("active").is_empty());
    assert_eq!(ids(&service.list_resolved().await.expect("resolved")), [todo.id]);
}

#[tokio::test]
async fn update_validates_input_and_existence() {
    let service = service().await;
    let todo = create(&service, "Keep", None, Priority::Medium).await;

    let err = service
        .update(
            todo.id,
            TodoChanges {
                title: Some(String::new()),
                ..TodoChanges::default()
            },
        )
        .await
        .expect_err("blank title should fail");
    assert!(err.is_validation());

    let err = service
        .update(
            todo.id + 100,
            TodoChanges {
                priority: Some(Priority::High),
                ..TodoChanges::default()
            },
        )
        .await
        .expect_err("missing todo should fail");
    assert!(err.is_not_found());

    assert_eq!(service.get(todo.id).await.expect("get todo").title, "Keep");
}

#[tokio::test]
async fn delete_removes_exactly_one_record() {
    let service = service().await;
    let keep = create(&service, "Keep", None, Priority::Medium).await;
    let removed = create(&service, "Drop", None, Priority::Medium).await;

    assert_eq!(service.count_all().await.expect("count"), 2);
    service.delete(removed.id).await.expect("delete todo");
    assert_eq!(service.count_all().await.expect("count"), 1);

    assert!(service.get(removed.id).await.expect_err("deleted").is_not_found());
    assert!(service.get(keep.id).await.is_ok());
    assert!(service.delete(removed.id).await.expect_err("already deleted").is_not_found());
}

#[tokio::test]
async fn counts_match_the_lists() {
    let service = service().await;
    let yesterday = today() - Duration::days(1);

    create(&service, "Undated", None, Priority::Medium).await;
    create(&service, "Due today", Some(today()), Priority::High).await;
    create(&service, "Overdue", Some(yesterday), Priority::Low).await;
    let done = create(&service, "Done", Some(yesterday), Priority::Low).await;
    let dropped = create(&service, "Dropped", None, Priority::High).await;
    service.toggle_resolved(done.id).await.expect("resolve");
    service.toggle_cancelled(dropped.id).await.expect("cancel");

    let counts = service.counts(today()).await.expect("counts");
    assert_eq!(
        counts,
        TodoCounts {
            active: 2,
            resolved: 1,
            cancelled: 1,
            expired: 1,
        }
    );
    assert_eq!(
        counts.active,
        service.list_active(today()).await.expect("active").len() as u64
    );
    assert_eq!(
        counts.expired,
        service.list_expired(today()).await.expect("expired").len() as u64
    );
}
