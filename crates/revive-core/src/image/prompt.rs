//! Restoration instruction sent alongside the photo

use crate::restoration::Locale;

use super::types::Strength;

const PROMPT_VI: &str = "Phục chế lại bức ảnh chân dung cũ này theo các yêu cầu sau:

1. **Giữ nguyên đặc điểm khuôn mặt và chi tiết gốc của nhân vật** – không thay đổi tỉ lệ khuôn mặt, dáng người hoặc trang phục.
2. **Khôi phục độ nét và chi tiết tự nhiên** ở mắt, miệng, tóc, tay và nền ảnh — tránh làm da quá mịn hoặc trông giả.
3. **Loại bỏ các vết nứt, bụi, ố vàng và nhiễu hạt** trên bức ảnh cũ.
4. **Tái tạo ánh sáng và tông màu tự nhiên như thật** – đảm bảo ánh sáng mềm mại, màu da hài hòa, không bệt màu, và giữ được cảm giác chân thực.
5. Nếu ảnh bị mờ hoặc thiếu nét, **hãy tái tạo chi tiết hợp lý** để khuôn mặt rõ ràng nhưng vẫn chân thực, không biến dạng.
6. Nếu ảnh có nhiều vùng hư hại, **hãy suy luận hợp lý để điền vào** mà không thay đổi bố cục tổng thể.

Kết quả cuối cùng phải có **chất lượng 4K sắc nét**, mang lại cảm giác **ảnh thật – chân thực – cảm xúc**, như một bức ảnh được chụp rõ nét nguyên bản chứ không phải ảnh AI tái tạo. Áp dụng mức độ phục chế là {level}%.";

const PROMPT_EN: &str = "Restore this old portrait photograph according to these requirements:

1. **Keep the subject's facial features and original details** - do not change face proportions, posture or clothing.
2. **Recover natural sharpness and detail** in the eyes, mouth, hair, hands and background - avoid overly smooth or fake-looking skin.
3. **Remove cracks, dust, yellowing and grain** from the old photo.
4. **Rebuild natural, lifelike lighting and tones** - soft light, balanced skin color, no flat color patches, a genuine feel.
5. If the photo is blurry or soft, **reconstruct plausible detail** so the face is clear yet realistic and undistorted.
6. If there are many damaged areas, **infer plausible content to fill them** without changing the overall composition.

The final result must be **sharp 4K quality** and feel **real, authentic and emotional**, like a crisp original photograph rather than an AI reconstruction. Apply a restoration level of {level}%.";

/// Render the instruction for the given language and strength
pub fn restoration_prompt(locale: Locale, strength: Strength) -> String {
    let template = match locale {
        Locale::Vi => PROMPT_VI,
        Locale::En => PROMPT_EN,
    };
    template.replace("{level}", &strength.to_string())
}
