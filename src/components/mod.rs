//! UI Components

mod delete_task_button;
mod new_task_form;
mod notice;
mod task_row;

pub use delete_task_button::DeleteTaskButton;
pub use new_task_form::NewTaskForm;
pub use notice::{use_notice, NoticeBanner, NoticeSlot, NOTICE_DISMISS_MS};
pub use task_row::TaskRow;
