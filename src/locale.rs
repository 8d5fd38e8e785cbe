use crate::models::{MilestoneCategory, Priority, Property, TaskStatus};

/// Display language of the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    pub fn parse(s: &str) -> Option<Locale> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Locale::En),
            "ar" | "arabic" => Some(Locale::Ar),
            _ => None,
        }
    }

    /// Row label for a task with an empty title.
    pub fn untitled_task(&self) -> &'static str {
        match self {
            Locale::En => "Untitled task",
            Locale::Ar => "مهمة بدون عنوان",
        }
    }

    pub fn unassigned_client(&self) -> &'static str {
        match self {
            Locale::En => "Unassigned client",
            Locale::Ar => "عميل غير محدد",
        }
    }

    pub fn status(&self, status: TaskStatus) -> &'static str {
        match (self, status) {
            (Locale::En, TaskStatus::Pending) => "Pending",
            (Locale::En, TaskStatus::InProgress) => "In progress",
            (Locale::En, TaskStatus::Completed) => "Completed",
            (Locale::En, TaskStatus::OnHold) => "On hold",
            (Locale::En, TaskStatus::Cancelled) => "Cancelled",
            (Locale::Ar, TaskStatus::Pending) => "قيد الانتظار",
            (Locale::Ar, TaskStatus::InProgress) => "جاري التنفيذ",
            (Locale::Ar, TaskStatus::Completed) => "مكتملة",
            (Locale::Ar, TaskStatus::OnHold) => "متوقفة",
            (Locale::Ar, TaskStatus::Cancelled) => "ملغاة",
        }
    }

    pub fn priority(&self, priority: Priority) -> &'static str {
        match (self, priority) {
            (Locale::En, Priority::Low) => "Low",
            (Locale::En, Priority::Medium) => "Medium",
            (Locale::En, Priority::High) => "High",
            (Locale::En, Priority::Urgent) => "Urgent",
            (Locale::Ar, Priority::Low) => "منخفضة",
            (Locale::Ar, Priority::Medium) => "متوسطة",
            (Locale::Ar, Priority::High) => "عالية",
            (Locale::Ar, Priority::Urgent) => "عاجلة",
        }
    }

    pub fn category(&self, category: MilestoneCategory) -> &'static str {
        match (self, category) {
            (Locale::En, MilestoneCategory::Planning) => "Planning",
            (Locale::En, MilestoneCategory::Construction) => "Construction",
            (Locale::En, MilestoneCategory::Inspection) => "Inspection",
            (Locale::En, MilestoneCategory::Payment) => "Payment",
            (Locale::En, MilestoneCategory::Delivery) => "Delivery",
            (Locale::Ar, MilestoneCategory::Planning) => "تخطيط",
            (Locale::Ar, MilestoneCategory::Construction) => "إنشاء",
            (Locale::Ar, MilestoneCategory::Inspection) => "فحص",
            (Locale::Ar, MilestoneCategory::Payment) => "دفعة",
            (Locale::Ar, MilestoneCategory::Delivery) => "تسليم",
        }
    }

    /// `<address> - <client name>` as shown in property pickers.
    pub fn property_label(&self, property: &Property) -> String {
        let client = property
            .client
            .as_ref()
            .and_then(|c| c.name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(self.unassigned_client());
        format!("{} - {}", property.address, client)
    }
}
