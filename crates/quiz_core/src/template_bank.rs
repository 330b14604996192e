//! crates/quiz_core/src/template_bank.rs
//!
//! The template bank maps a knowledge entry title onto hand-written question
//! templates. It is built once at startup and handed to the synthesizer
//! explicitly; nothing in the engine reaches for it as global state.

use std::collections::HashMap;

use tracing::warn;

use crate::domain::QuestionTemplate;

/// Distractors paired with a sentence of the entry content when no template matches.
pub const GENERIC_DISTRACTORS: [&str; 3] = [
    "这是一个错误的选项1",
    "这是一个错误的选项2",
    "这是一个错误的选项3",
];

/// Prompt used for questions synthesized without a template.
pub fn generic_prompt(title: &str) -> String {
    format!("关于{title}，以下说法正确的是？")
}

/// Explanation used for questions synthesized without a template.
pub fn generic_explanation(title: &str, content: &str) -> String {
    format!("{title}：{content}")
}

#[derive(Debug, Clone, Default)]
pub struct TemplateBank {
    templates: HashMap<String, Vec<QuestionTemplate>>,
}

impl TemplateBank {
    /// Builds a bank from `(title, templates)` pairs.
    ///
    /// Templates whose `correct_index` does not address one of their options are
    /// dropped, so every template served by the bank is answerable.
    pub fn new<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (T, Vec<QuestionTemplate>)>,
        T: Into<String>,
    {
        let mut templates: HashMap<String, Vec<QuestionTemplate>> = HashMap::new();
        for (title, variants) in entries {
            let title = title.into();
            let valid: Vec<QuestionTemplate> = variants
                .into_iter()
                .filter(|t| {
                    let ok = t.correct_index < t.options.len();
                    if !ok {
                        warn!(title = %title, prompt = t.prompt, "Dropping template with out-of-range answer");
                    }
                    ok
                })
                .collect();
            if !valid.is_empty() {
                templates.entry(title).or_default().extend(valid);
            }
        }
        Self { templates }
    }

    /// The bank shipped with the service, covering the curated science knowledge base.
    pub fn builtin() -> Self {
        Self::new(builtin_templates())
    }

    /// Templates registered for `title`; empty when the title is unknown.
    pub fn templates_for(&self, title: &str) -> &[QuestionTemplate] {
        self.templates.get(title).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Number of titles with at least one template.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

const fn template(
    prompt: &'static str,
    options: [&'static str; 4],
    correct_index: usize,
    explanation: &'static str,
) -> QuestionTemplate {
    QuestionTemplate {
        prompt,
        options,
        correct_index,
        explanation,
    }
}

fn builtin_templates() -> Vec<(&'static str, Vec<QuestionTemplate>)> {
    vec![
        (
            "水的三态变化",
            vec![
                template(
                    "水的三态变化包括哪些状态？",
                    ["固态、液态、气态", "固态、液态、等离子态", "液态、气态、等离子态", "固态、气态、等离子态"],
                    0,
                    "水有三种状态：固态（冰）、液态（水）、气态（水蒸气）。",
                ),
                template(
                    "水的三态变化属于什么变化？",
                    ["化学变化", "物理变化", "生物变化", "核变化"],
                    1,
                    "水的三态变化是物理变化，由温度变化引起。",
                ),
                template(
                    "水在什么条件下会从液态变成固态？",
                    ["温度升高", "温度降低", "压力增大", "压力减小"],
                    1,
                    "水在温度降低到0°C以下时会从液态变成固态（冰）。",
                ),
            ],
        ),
        (
            "哺乳动物特征",
            vec![
                template(
                    "哺乳动物的主要特征是什么？",
                    ["胎生哺乳", "卵生", "冷血", "体表有鳞片"],
                    0,
                    "哺乳动物的主要特征包括：胎生、哺乳、体表被毛、体温恒定、心脏四腔。",
                ),
                template(
                    "以下哪种动物不是哺乳动物？",
                    ["狗", "猫", "鸡", "鲸鱼"],
                    2,
                    "鸡是鸟类，不是哺乳动物。狗、猫和鲸鱼都是哺乳动物。",
                ),
                template(
                    "哺乳动物的体温特点是？",
                    ["体温恒定", "体温不恒定", "随环境变化", "无法确定"],
                    0,
                    "哺乳动物是恒温动物，体温保持恒定。",
                ),
            ],
        ),
        (
            "光合作用",
            vec![
                template(
                    "光合作用的主要场所是？",
                    ["叶绿体", "线粒体", "细胞核", "细胞质"],
                    0,
                    "光合作用是植物利用光能将二氧化碳和水转化为有机物并释放氧气的过程，主要场所是叶绿体。",
                ),
                template(
                    "光合作用的原料是什么？",
                    ["氧气和水", "二氧化碳和水", "氧气和二氧化碳", "水和无机盐"],
                    1,
                    "光合作用的原料是二氧化碳和水，产物是有机物和氧气。",
                ),
                template(
                    "光合作用需要什么条件？",
                    ["光照", "黑暗", "低温", "高压"],
                    0,
                    "光合作用需要光照作为能量来源。",
                ),
            ],
        ),
        (
            "简单机械",
            vec![
                template(
                    "以下哪项不属于简单机械？",
                    ["杠杆", "滑轮", "蒸汽机", "斜面"],
                    2,
                    "简单机械包括：杠杆、滑轮、轮轴、斜面、楔、螺旋。蒸汽机是一种复杂的热机，不属于简单机械。",
                ),
                template(
                    "杠杆的支点是指？",
                    ["杠杆的固定点", "杠杆的受力点", "杠杆的作用点", "杠杆的重心"],
                    0,
                    "杠杆的支点是杠杆绕着转动的固定点。",
                ),
                template(
                    "斜面的作用是？",
                    ["省力", "费力", "不省力也不费力", "以上都不对"],
                    0,
                    "斜面可以省力，但需要移动更长的距离。",
                ),
            ],
        ),
        (
            "声音传播介质",
            vec![
                template(
                    "声音不能在以下哪种介质中传播？",
                    ["空气", "水", "真空", "金属"],
                    2,
                    "声音需要介质传播，介质密度越大，传播速度越快。声音不能在真空中传播，因为真空中没有物质粒子来传递声波。",
                ),
                template(
                    "声音在以下哪种介质中传播速度最快？",
                    ["空气", "水", "钢铁", "真空"],
                    2,
                    "声音在固体中传播速度最快，在液体中次之，在气体中最慢。声音不能在真空中传播。",
                ),
            ],
        ),
        (
            "导体与绝缘体",
            vec![
                template(
                    "以下哪种物质是导体？",
                    ["塑料", "橡胶", "铜", "玻璃"],
                    2,
                    "铜是导体，塑料、橡胶和玻璃是绝缘体。",
                ),
                template(
                    "以下哪种物质是绝缘体？",
                    ["铜", "铝", "塑料", "铁"],
                    2,
                    "塑料是绝缘体，铜、铝和铁是导体。",
                ),
            ],
        ),
        (
            "地球自转",
            vec![
                template(
                    "地球自转产生了什么现象？",
                    ["四季变化", "昼夜交替", "潮汐", "极光"],
                    1,
                    "地球自西向东自转，周期约为24小时，产生昼夜交替现象。四季变化是由地球公转引起的，潮汐是由月球和太阳的引力引起的，极光是由太阳活动引起的。",
                ),
                template(
                    "地球自转的方向是？",
                    ["自东向西", "自西向东", "自北向南", "自南向北"],
                    1,
                    "地球自西向东自转，周期约为24小时，产生昼夜交替现象。",
                ),
            ],
        ),
        (
            "可再生能源",
            vec![
                template(
                    "以下哪种能源是可再生能源？",
                    ["煤炭", "石油", "太阳能", "天然气"],
                    2,
                    "太阳能是可再生能源，煤炭、石油和天然气是不可再生能源。",
                ),
                template(
                    "可再生能源的特点是？",
                    ["会耗尽", "可以不断再生", "污染环境", "成本高"],
                    1,
                    "可再生能源是可以不断再生的能源，如太阳能、风能、水能、生物质能等。",
                ),
            ],
        ),
        (
            "呼吸系统",
            vec![
                template(
                    "人体呼吸系统包括什么？",
                    ["鼻腔和喉咙", "呼吸道和肺", "气管和肺", "鼻腔和肺"],
                    1,
                    "人体呼吸系统包括呼吸道和肺，肺是气体交换的主要场所。",
                ),
                template(
                    "人体气体交换的主要场所是？",
                    ["鼻腔", "喉咙", "肺", "气管"],
                    2,
                    "人体呼吸系统包括呼吸道和肺，肺是气体交换的主要场所。鼻腔、喉咙和气管是呼吸道的组成部分，主要作用是过滤、温暖和湿润空气。",
                ),
            ],
        ),
        (
            "伯努利原理",
            vec![
                template(
                    "伯努利原理描述的是？",
                    ["空气流速大的地方压强大", "空气流速大的地方压强小", "空气流速与压强无关", "空气流速小的地方压强小"],
                    1,
                    "伯努利原理指出：流体流速大的地方压强小，流速小的地方压强大。",
                ),
                template(
                    "根据伯努利原理，飞机机翼产生升力的原因是？",
                    ["机翼上方空气流速大，压强小", "机翼上方空气流速小，压强大", "机翼下方空气流速大，压强小", "机翼下方空气流速小，压强大"],
                    0,
                    "根据伯努利原理，飞机机翼上表面弯曲，空气流速大，压强小；下表面平坦，空气流速小，压强大，产生向上的升力。",
                ),
            ],
        ),
        (
            "鸟为什么会飞",
            vec![
                template(
                    "鸟的翅膀形状有利于飞行，这是因为？",
                    ["翅膀面积大", "翅膀上表面弯曲，下表面平坦", "翅膀重量轻", "翅膀有羽毛"],
                    1,
                    "鸟的翅膀上表面弯曲，下表面平坦，使得上表面空气流速大，压强小，下表面空气流速小，压强大，产生向上的升力。",
                ),
                template(
                    "鸟飞行时，翅膀上方的空气流速？",
                    ["比下方大", "比下方小", "与下方相同", "无法确定"],
                    0,
                    "鸟飞行时，翅膀上方的空气流速比下方大，因为上表面弯曲，空气需要经过更长的距离。",
                ),
            ],
        ),
        (
            "声音的三要素",
            vec![
                template(
                    "声音的三要素不包括？",
                    ["响度", "音调", "音色", "频率"],
                    3,
                    "声音的三要素是响度、音调和音色。频率是影响音调的因素，不是声音的三要素之一。",
                ),
                template(
                    "以下哪项不是声音的三要素？",
                    ["响度", "音调", "音色", "振幅"],
                    3,
                    "声音的三要素是响度、音调和音色。振幅是影响响度的因素，不是声音的三要素之一。",
                ),
            ],
        ),
        (
            "影响声音响度的因素",
            vec![
                template(
                    "影响声音响度的因素是？",
                    ["频率", "振幅", "介质", "温度"],
                    1,
                    "影响声音响度的因素是振幅，振幅越大，响度越大。",
                ),
                template(
                    "以下哪种情况声音响度最大？",
                    ["振幅小", "振幅大", "频率高", "频率低"],
                    1,
                    "振幅越大，响度越大。",
                ),
            ],
        ),
        (
            "影响声音音调的因素",
            vec![
                template(
                    "影响声音音调的因素是？",
                    ["振幅", "频率", "介质", "温度"],
                    1,
                    "影响声音音调的因素是频率，频率越高，音调越高。",
                ),
                template(
                    "以下哪种情况声音音调最高？",
                    ["频率低", "频率高", "振幅小", "振幅大"],
                    1,
                    "频率越高，音调越高。",
                ),
            ],
        ),
        (
            "影响声音音色的因素",
            vec![
                template(
                    "影响声音音色的因素是？",
                    ["振幅", "频率", "发声体的材料和结构", "介质"],
                    2,
                    "影响声音音色的因素是发声体的材料和结构。",
                ),
                template(
                    "不同乐器演奏同一首曲子，我们能分辨出来是因为？",
                    ["响度不同", "音调不同", "音色不同", "频率不同"],
                    2,
                    "不同乐器的音色不同，我们能通过音色分辨不同的乐器。",
                ),
            ],
        ),
        (
            "声音传播需要介质",
            vec![
                template(
                    "声音传播需要什么？",
                    ["真空", "介质", "电力", "磁力"],
                    1,
                    "声音传播需要介质，介质可以是固体、液体或气体。",
                ),
                template(
                    "为什么声音不能在真空中传播？",
                    ["真空温度太低", "真空没有介质", "真空压力太大", "真空没有光线"],
                    1,
                    "声音传播需要介质，真空中没有物质粒子来传递声波，所以声音不能在真空中传播。",
                ),
            ],
        ),
        (
            "声音在不同介质中的传播速度",
            vec![
                template(
                    "声音在以下哪种介质中传播速度最快？",
                    ["空气", "水", "钢铁", "真空"],
                    2,
                    "声音在固体中传播速度最快，在液体中次之，在气体中最慢。声音不能在真空中传播。",
                ),
                template(
                    "声音在以下哪种介质中传播速度最慢？",
                    ["钢铁", "水", "空气", "以上都不对"],
                    2,
                    "声音在气体中传播速度最慢，在液体中次之，在固体中最快。",
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_bank_covers_the_curated_titles() {
        let bank = TemplateBank::builtin();
        assert_eq!(bank.len(), 17);
        assert_eq!(bank.templates_for("光合作用").len(), 3);
        assert_eq!(bank.templates_for("地球自转").len(), 2);
        assert!(bank.templates_for("不存在的标题").is_empty());
    }

    #[test]
    fn every_builtin_template_is_answerable() {
        let bank = TemplateBank::builtin();
        for title in bank.titles() {
            for t in bank.templates_for(title) {
                assert!(t.correct_index < t.options.len(), "{title}: {}", t.prompt);
                assert!(!t.correct_option().is_empty());
            }
        }
    }

    #[test]
    fn out_of_range_templates_are_dropped() {
        let broken = template("?", ["a", "b", "c", "d"], 4, "");
        let fine = template("!", ["a", "b", "c", "d"], 3, "");
        let bank = TemplateBank::new(vec![("broken", vec![broken]), ("mixed", vec![broken, fine])]);

        assert!(bank.templates_for("broken").is_empty());
        assert_eq!(bank.templates_for("mixed"), &[fine]);
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn generic_text_helpers() {
        assert_eq!(generic_prompt("浮力"), "关于浮力，以下说法正确的是？");
        assert_eq!(generic_explanation("浮力", "物体受到向上的力。"), "浮力：物体受到向上的力。");
    }
}
