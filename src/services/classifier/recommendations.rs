use crate::models::classify_types::Category;
use crate::services::localization::Locale;

/// Ordered action list for a category, most urgent first.
pub fn recommend(category: &Category, locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Ar => arabic(category),
        Locale::En => english(category),
    }
}

fn arabic(category: &Category) -> &'static [&'static str] {
    match category {
        Category::Fire => &[
            "اتصل بالإطفاء فوراً على الرقم 998",
            "قم بإخلاء المنطقة المحيطة",
            "لا تحاول إطفاء الحريق بنفسك إذا كان كبيراً",
            "تأكد من سلامة الطرق المؤدية للموقع",
        ],
        Category::Traffic => &[
            "استخدم طرق بديلة إذا أمكن",
            "تحلى بالصبر وتجنب القيادة العدوانية",
            "حافظ على مسافة آمنة بين المركبات",
            "استخدم تطبيقات المرور لمعرفة الطرق الأفضل",
        ],
        Category::Accident => &[
            "اتصل بالإسعاف على الرقم 997",
            "لا تحرك المصابين إلا إذا كانوا في خطر",
            "قم بتأمين موقع الحادث",
            "انتظر وصول فرق الطوارئ",
        ],
        Category::Violence => &[
            "اتصل بالشرطة فوراً على الرقم 999",
            "ابتعد عن منطقة الخطر",
            "لا تتدخل مباشرة إلا إذا كنت مدرباً",
            "قم بتوثيق الحادث إذا أمكن بأمان",
        ],
        Category::Normal => &[
            "الوضع طبيعي وآمن",
            "استمر في المراقبة الدورية",
            "حافظ على اليقظة",
            "قم بالإبلاغ عن أي تغيير في الوضع",
        ],
        Category::Unknown(_) => &["تم التحليل بنجاح"],
    }
}

fn english(category: &Category) -> &'static [&'static str] {
    match category {
        Category::Fire => &[
            "Call the fire department immediately on 998",
            "Evacuate the surrounding area",
            "Do not try to put out a large fire yourself",
            "Make sure the roads leading to the site are clear",
        ],
        Category::Traffic => &[
            "Use alternative routes if possible",
            "Be patient and avoid aggressive driving",
            "Keep a safe distance between vehicles",
            "Use traffic apps to find the best routes",
        ],
        Category::Accident => &[
            "Call an ambulance on 997",
            "Do not move the injured unless they are in danger",
            "Secure the accident scene",
            "Wait for emergency teams to arrive",
        ],
        Category::Violence => &[
            "Call the police immediately on 999",
            "Move away from the danger zone",
            "Do not intervene directly unless you are trained",
            "Document the incident if it is safe to do so",
        ],
        Category::Normal => &[
            "The situation is normal and safe",
            "Continue routine monitoring",
            "Stay alert",
            "Report any change in the situation",
        ],
        Category::Unknown(_) => &["Analysis completed successfully"],
    }
}
