/// Ongoing "timer running" indicator owned by the host platform
/// (a notification, a tray icon, a status line).
pub trait SessionIndicator: Send + Sync {
    fn show(&self, task_name: &str);
    fn clear(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIndicator;

impl SessionIndicator for NoopIndicator {
    fn show(&self, _task_name: &str) {}
    fn clear(&self) {}
}
