use serde::{Deserialize, Serialize};

use super::question::{Difficulty, TopicCategory};

/// 各难度的题目数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DifficultyDistribution {
    /// Nhận biết
    pub nb: usize,
    /// Thông hiểu
    pub th: usize,
    /// Vận dụng
    pub vd: usize,
}

impl DifficultyDistribution {
    pub fn total(&self) -> usize {
        self.nb + self.th + self.vd
    }

    pub fn count_for(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Knowing => self.nb,
            Difficulty::Understanding => self.th,
            Difficulty::Applying => self.vd,
        }
    }
}

/// 出题矩阵中的一项：对应一次 LLM 请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamMatrixEntry {
    pub category: TopicCategory,
    /// 目标题量
    pub count: usize,
    pub topics: Vec<String>,
    pub difficulty: DifficultyDistribution,
}

impl ExamMatrixEntry {
    fn new(
        category: TopicCategory,
        count: usize,
        topics: &[&str],
        difficulty: DifficultyDistribution,
    ) -> Self {
        Self {
            category,
            count,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            difficulty,
        }
    }
}

/// 内置的九年级数学出题矩阵（共 50 题）
pub fn default_exam_matrix() -> Vec<ExamMatrixEntry> {
    vec![
        ExamMatrixEntry::new(
            TopicCategory::Algebra,
            24,
            &[
                "Căn bậc hai, Căn bậc ba",
                "Hàm số bậc nhất y = ax + b",
                "Hệ hai phương trình bậc nhất hai ẩn",
                "Hàm số y = ax² (a ≠ 0) và Phương trình bậc hai một ẩn",
            ],
            DifficultyDistribution { nb: 10, th: 7, vd: 7 },
        ),
        ExamMatrixEntry::new(
            TopicCategory::Geometry,
            19,
            &[
                "Hệ thức lượng trong tam giác vuông",
                "Đường tròn (Đường kính, dây cung, tiếp tuyến)",
                "Góc với đường tròn (Góc nội tiếp, Tứ giác nội tiếp)",
                "Hình trụ, Hình nón, Hình cầu",
            ],
            DifficultyDistribution { nb: 7, th: 5, vd: 7 },
        ),
        ExamMatrixEntry::new(
            TopicCategory::Statistics,
            7,
            &[
                "Thống kê (Bảng tần số, biểu đồ)",
                "Xác suất (Xác suất thực nghiệm)",
            ],
            DifficultyDistribution { nb: 3, th: 3, vd: 1 },
        ),
    ]
}
