//! 出题提示词

use crate::models::{Difficulty, ExamMatrixEntry};

/// 系统消息
pub const SYSTEM_MESSAGE: &str = "Bạn là giáo viên Toán giàu kinh nghiệm, chuyên ra đề thi tuyển sinh vào lớp 10 tại Việt Nam. \
Bạn chỉ trả về JSON hợp lệ, không kèm giải thích bên ngoài JSON.";

/// 期望的返回结构，直接嵌入提示词
const RESPONSE_SHAPE: &str = r#"{
  "questions": [
    {
      "topic": "string",
      "difficulty": "Nhận biết" | "Thông hiểu" | "Vận dụng",
      "content": "Question text. Use LaTeX for math, wrapped in $...$.",
      "options": ["exactly", "4", "option", "strings"],
      "correctAnswer": 0,
      "explanation": "Detailed step-by-step solution.",
      "solutionMethod2": "optional alternative method",
      "geometrySvg": "optional simple SVG without <?xml...>, viewBox 0 0 200 200"
    }
  ]
}"#;

/// 为一个矩阵项构建出题提示词
pub fn build_prompt(entry: &ExamMatrixEntry) -> String {
    let distribution = Difficulty::ALL
        .iter()
        .map(|d| {
            format!(
                "- Difficulty '{}' ({}): {} questions",
                d.label(),
                d.english(),
                entry.difficulty.count_for(*d)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Create a list of multiple-choice math questions for a Grade 10 Entrance Exam in Vietnam (Thi tuyển sinh vào lớp 10).

CRITICAL CONSTRAINT: Use strictly Vietnam GRADE 9 MATH CURRICULUM (Kiến thức Toán Lớp 9).
- Do NOT use Grade 10+ topics (Vectors, Trigonometric Circles, Sets, etc.).
- Focus on: Square roots, Linear functions, Systems of linear equations, Quadratic functions (y=ax^2), Quadratic equations, Circle geometry, Inscribed quadrilaterals, Cylinder/Cone/Sphere.

Category: {category}
Topics: {topics}

Quantity Distribution (total {total}):
{distribution}

Requirements:
1. Language: Vietnamese.
2. Math formatting: Use LaTeX wrapped in single dollar signs (e.g., $x^2 + 2x$) for equations.
3. Geometry: For geometry questions, try to provide a simple SVG string in 'geometrySvg' property illustrating the problem.
4. Multiple Solutions: For 'Thông hiểu' and 'Vận dụng' questions where possible, provide a second solving method in 'solutionMethod2'.
5. Ensure options are plausible distractors. Every question has exactly 4 options and 'correctAnswer' is the 0-based index (0-3) of the correct option.
6. Return strictly valid JSON with this shape:
{shape}"#,
        category = entry.category.name(),
        topics = entry.topics.join(", "),
        total = entry.difficulty.total(),
        distribution = distribution,
        shape = RESPONSE_SHAPE,
    )
}
