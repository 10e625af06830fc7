use crate::models::classify_types::{Category, RiskLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ar,
    En,
}

impl Locale {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ar" => Some(Locale::Ar),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn texts(self) -> &'static Texts {
        match self {
            Locale::Ar => &AR,
            Locale::En => &EN,
        }
    }

    pub fn category_title(self, category: &Category) -> &'static str {
        let ar = self == Locale::Ar;
        match category {
            Category::Fire => if ar { "حريق" } else { "Fire" },
            Category::Traffic => if ar { "حركة مرور" } else { "Traffic" },
            Category::Accident => if ar { "حادث" } else { "Accident" },
            Category::Violence => if ar { "عنف" } else { "Violence" },
            Category::Normal => if ar { "طبيعي" } else { "Normal" },
            Category::Unknown(_) => if ar { "غير محدد" } else { "Unspecified" },
        }
    }

    pub fn risk_text(self, level: RiskLevel) -> &'static str {
        let ar = self == Locale::Ar;
        match level {
            RiskLevel::Low => if ar { "منخفض" } else { "Low" },
            RiskLevel::Medium => if ar { "متوسط" } else { "Medium" },
            RiskLevel::High => if ar { "عالي" } else { "High" },
            RiskLevel::Critical => if ar { "حرج" } else { "Critical" },
        }
    }

    /// Sentence describing a `(category, subcategory)` pair.
    pub fn description(self, category: &Category, subcategory: Option<&str>) -> &'static str {
        let ar = self == Locale::Ar;
        let found = match (category, subcategory.unwrap_or_default()) {
            (Category::Fire, "small") => Some(if ar { "تم اكتشاف حريق صغير يتطلب تدخل سريع" } else { "A small fire was detected and needs a quick response" }),
            (Category::Fire, "large") => Some(if ar { "تم اكتشاف حريق كبير يتطلب تدخل عاجل" } else { "A large fire was detected and needs an urgent response" }),
            (Category::Fire, "smoke") => Some(if ar { "تم اكتشاف دخان قد يشير إلى بداية حريق" } else { "Smoke was detected that may indicate a starting fire" }),
            (Category::Traffic, "light") => Some(if ar { "حركة مرور عادية" } else { "Normal traffic flow" }),
            (Category::Traffic, "heavy") => Some(if ar { "ازدحام مروري شديد" } else { "Heavy traffic congestion" }),
            (Category::Traffic, "jam") => Some(if ar { "توقف تام في حركة المرور" } else { "Traffic is at a complete standstill" }),
            (Category::Accident, "minor") => Some(if ar { "حادث بسيط بدون إصابات خطيرة" } else { "Minor accident without serious injuries" }),
            (Category::Accident, "major") => Some(if ar { "حادث خطير يتطلب تدخل الطوارئ" } else { "Serious accident requiring emergency services" }),
            (Category::Violence, "verbal") => Some(if ar { "عنف لفظي أو تهديد" } else { "Verbal violence or threats" }),
            (Category::Violence, "physical") => Some(if ar { "عنف جسدي يتطلب تدخل فوري" } else { "Physical violence requiring immediate intervention" }),
            (Category::Normal, "safe") => Some(if ar { "الوضع طبيعي وآمن" } else { "The situation is normal and safe" }),
            _ => None,
        };
        found.unwrap_or(self.texts().classified_successfully)
    }

    pub fn delivery_method(self, method: &str) -> String {
        match method {
            "email" if self == Locale::Ar => "البريد الإلكتروني".to_string(),
            "email" => "Email".to_string(),
            other => other.to_string(),
        }
    }

    pub fn relative_age(self, minutes: i64) -> String {
        let ar = self == Locale::Ar;
        if minutes < 1 {
            return if ar { "الآن".to_string() } else { "now".to_string() };
        }
        if minutes < 60 {
            return if ar {
                format!("منذ {} دقيقة", minutes)
            } else {
                format!("{} minutes ago", minutes)
            };
        }
        let hours = minutes / 60;
        if hours < 24 {
            return if ar {
                format!("منذ {} ساعة", hours)
            } else {
                format!("{} hours ago", hours)
            };
        }
        let days = hours / 24;
        if ar {
            format!("منذ {} يوم", days)
        } else {
            format!("{} days ago", days)
        }
    }
}

/// Fixed UI strings for one locale.
pub struct Texts {
    pub unsupported_file: &'static str,
    pub file_too_large: &'static str,
    pub select_image_first: &'static str,
    pub login_required: &'static str,
    pub session_busy: &'static str,
    pub analysis_failed: &'static str,
    pub analysis_succeeded: &'static str,
    pub classified_successfully: &'static str,
    pub preparing: &'static str,
    pub uploading: &'static str,
    pub analyzing: &'static str,
    pub history_load_failed: &'static str,
    pub details_load_failed: &'static str,
    pub delete_succeeded: &'static str,
    pub delete_failed: &'static str,
    pub report_ready: &'static str,
    pub details_report_ready: &'static str,
    pub report_failed: &'static str,
    pub file_ready: &'static str,
    pub alert_sent: &'static str,
    pub alert_not_sent: &'static str,
    pub share_title: &'static str,
    pub seconds: &'static str,
}

static AR: Texts = Texts {
    unsupported_file: "نوع الملف غير مدعوم. يرجى اختيار صورة بصيغة JPG, PNG, GIF أو WebP",
    file_too_large: "حجم الملف كبير جداً. الحد الأقصى 32MB",
    select_image_first: "الرجاء اختيار صورة أولاً",
    login_required: "يجب تسجيل الدخول أولاً",
    session_busy: "يوجد تحليل قيد التنفيذ بالفعل",
    analysis_failed: "حدث خطأ أثناء تحليل الصورة",
    analysis_succeeded: "تم التحليل بنجاح",
    classified_successfully: "تم تصنيف الصورة بنجاح",
    preparing: "جاري التحضير...",
    uploading: "جاري رفع الصورة...",
    analyzing: "جاري تحليل الصورة...",
    history_load_failed: "فشل في تحميل التاريخ",
    details_load_failed: "فشل في تحميل تفاصيل التصنيف",
    delete_succeeded: "تم حذف التصنيف بنجاح",
    delete_failed: "فشل في حذف التصنيف",
    report_ready: "تم تحميل تقرير التحليل بنجاح",
    details_report_ready: "تم تحميل تقرير التصنيف بنجاح",
    report_failed: "فشل في تحميل التقرير",
    file_ready: "تم اختيار الصورة",
    alert_sent: "تم الإرسال",
    alert_not_sent: "لم يُرسل",
    share_title: "نتائج تحليل الصورة - نظام الأمان الذكي",
    seconds: "ثانية",
};

static EN: Texts = Texts {
    unsupported_file: "Unsupported file type. Please choose a JPG, PNG, GIF or WebP image",
    file_too_large: "The file is too large. The maximum is 32MB",
    select_image_first: "Please choose an image first",
    login_required: "You must sign in first",
    session_busy: "An analysis is already in progress",
    analysis_failed: "An error occurred while analyzing the image",
    analysis_succeeded: "Analysis completed successfully",
    classified_successfully: "The image was classified successfully",
    preparing: "Preparing...",
    uploading: "Uploading image...",
    analyzing: "Analyzing image...",
    history_load_failed: "Failed to load history",
    details_load_failed: "Failed to load classification details",
    delete_succeeded: "Classification deleted",
    delete_failed: "Failed to delete classification",
    report_ready: "Analysis report downloaded",
    details_report_ready: "Classification report downloaded",
    report_failed: "Failed to download the report",
    file_ready: "Image selected",
    alert_sent: "Sent",
    alert_not_sent: "Not sent",
    share_title: "Image analysis results - Smart Safety System",
    seconds: "seconds",
};
