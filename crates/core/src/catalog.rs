//! Static companion characters and their phrase lists.
//!
//! The lifecycle reads exactly four lists per character: `tasks`, the three
//! `progress_reports` buckets and the two `reflection_templates` buckets.

use thiserror::Error;

pub const PROGRAMMING_CAT: &str = "programming_cat";
pub const WRITING_DOG: &str = "writing_dog";

/// Mixed into the working phrases while a focus period runs.
pub const FOCUS_ENCOURAGEMENTS: &[&str] = &[
    "保持专注，你做得很棒！",
    "让我们一起完成目标！",
    "休息一下眼睛也很重要哦",
    "保持这个节奏，我们能行！",
    "你的进度很不错呢",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog has no characters")]
    Empty,

    #[error("duplicate character id: {0}")]
    DuplicateId(String),

    #[error("character {id} has an empty {list} list")]
    EmptyList { id: String, list: &'static str },

    #[error("character {id} has a blank entry in its {list} list")]
    BlankEntry { id: String, list: &'static str },
}

/// How the user's session ended, which selects the companion's closing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionLevel {
    Completed,
    Partial,
}

impl CompletionLevel {
    /// A written reflection counts as a completed session.
    #[must_use]
    pub fn from_reflection(reflection: &str) -> Self {
        if reflection.trim().is_empty() {
            Self::Partial
        } else {
            Self::Completed
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReports {
    pub thinking: Vec<String>,
    pub working: Vec<String>,
    pub reflecting: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionTemplates {
    pub completed: Vec<String>,
    pub partial: Vec<String>,
}

impl ReflectionTemplates {
    #[must_use]
    pub fn for_level(&self, level: CompletionLevel) -> &[String] {
        match level {
            CompletionLevel::Completed => &self.completed,
            CompletionLevel::Partial => &self.partial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub description: String,
    pub tasks: Vec<String>,
    pub progress_reports: ProgressReports,
    pub reflection_templates: ReflectionTemplates,
}

impl Character {
    /// Opening line shown while idle or preparing.
    #[must_use]
    pub fn first_thinking(&self) -> &str {
        first(&self.progress_reports.thinking)
    }

    /// Line shown when the prompt opens after a natural completion.
    #[must_use]
    pub fn first_completed(&self) -> &str {
        first(&self.reflection_templates.completed)
    }

    /// Working phrases plus the shared encouragements, for message rotation.
    #[must_use]
    pub fn rotation_messages(&self) -> Vec<&str> {
        self.progress_reports
            .working
            .iter()
            .map(String::as_str)
            .chain(FOCUS_ENCOURAGEMENTS.iter().copied())
            .collect()
    }

    fn check(&self) -> Result<(), CatalogError> {
        let lists: [(&'static str, &[String]); 6] = [
            ("tasks", &self.tasks),
            ("thinking", &self.progress_reports.thinking),
            ("working", &self.progress_reports.working),
            ("reflecting", &self.progress_reports.reflecting),
            ("completed", &self.reflection_templates.completed),
            ("partial", &self.reflection_templates.partial),
        ];
        for (list, entries) in lists {
            if entries.is_empty() {
                return Err(CatalogError::EmptyList {
                    id: self.id.clone(),
                    list,
                });
            }
            if entries.iter().any(|e| e.trim().is_empty()) {
                return Err(CatalogError::BlankEntry {
                    id: self.id.clone(),
                    list,
                });
            }
        }
        Ok(())
    }
}

fn first(list: &[String]) -> &str {
    list.first().map_or("", String::as_str)
}

/// Read-only set of selectable characters.
#[derive(Debug, Clone)]
pub struct Catalog {
    characters: Vec<Character>,
}

impl Catalog {
    /// Build a catalog, rejecting characters with an empty or blank phrase.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the catalog is empty, ids repeat, or a
    /// phrase list is empty or holds a blank entry.
    pub fn new(characters: Vec<Character>) -> Result<Self, CatalogError> {
        if characters.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (index, character) in characters.iter().enumerate() {
            character.check()?;
            if characters[..index].iter().any(|c| c.id == character.id) {
                return Err(CatalogError::DuplicateId(character.id.clone()));
            }
        }
        Ok(Self { characters })
    }

    /// The two characters that ship with the app.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            characters: vec![programming_cat(), writing_dog()],
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    /// First character in catalog order.
    #[must_use]
    pub fn default_character(&self) -> &Character {
        &self.characters[0]
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn programming_cat() -> Character {
    Character {
        id: PROGRAMMING_CAT.into(),
        name: "程序猫".into(),
        emoji: "🐱".into(),
        description: "一只热爱编程的小猫，擅长解决各种技术问题".into(),
        tasks: strings(&[
            "编写新的功能模块",
            "重构旧代码",
            "修复Bug",
            "写单元测试",
            "代码审查",
            "优化性能",
            "学习新技术",
            "写技术文档",
        ]),
        progress_reports: ProgressReports {
            thinking: strings(&[
                "让我想想今天要做什么...",
                "正在规划今天的编程任务...",
                "查看待办清单中...",
            ]),
            working: strings(&[
                "专注写代码中...",
                "调试这段代码...",
                "思考最佳实现方式...",
                "测试新功能...",
            ]),
            reflecting: strings(&[
                "代码质量不错！",
                "这个功能实现得很优雅",
                "找到了一个更好的解决方案",
            ]),
        },
        reflection_templates: ReflectionTemplates {
            completed: strings(&[
                "完成了今天的编程任务！代码质量很不错",
                "按计划完成了功能开发，测试通过了",
                "今天的代码写得很顺利，学到了新知识",
            ]),
            partial: strings(&[
                "遇到了一些技术难题，但在努力解决",
                "完成了部分功能，明天继续加油",
                "今天的任务有点具有挑战性，需要更多思考",
            ]),
        },
    }
}

fn writing_dog() -> Character {
    Character {
        id: WRITING_DOG.into(),
        name: "写作狗".into(),
        emoji: "🐕".into(),
        description: "一只热爱写作的小狗，擅长创意和文字表达".into(),
        tasks: strings(&[
            "写一篇博客文章",
            "编辑文稿",
            "构思新故事",
            "修改文章结构",
            "校对文章",
            "写读书笔记",
            "整理写作素材",
            "翻译文章",
        ]),
        progress_reports: ProgressReports {
            thinking: strings(&[
                "在构思新的写作主题...",
                "整理今天的写作计划...",
                "翻阅资料获取灵感...",
            ]),
            working: strings(&[
                "专注写作中...",
                "修改文章结构...",
                "润色文字...",
                "检查文章逻辑...",
            ]),
            reflecting: strings(&[
                "这段写得很流畅！",
                "故事情节安排得不错",
                "找到了更好的表达方式",
            ]),
        },
        reflection_templates: ReflectionTemplates {
            completed: strings(&[
                "今天的写作目标达成了！文章很有感染力",
                "按计划完成了文章，结构很清晰",
                "写作状态很好，产出了优质内容",
            ]),
            partial: strings(&[
                "遇到了一些写作瓶颈，但在突破中",
                "完成了部分内容，需要继续打磨",
                "今天的写作有点卡壳，需要调整状态",
            ]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_passes_validation() {
        let builtin = Catalog::builtin();
        let rebuilt = Catalog::new(builtin.characters().to_vec()).unwrap();
        assert_eq!(rebuilt.characters().len(), 2);
        assert_eq!(rebuilt.default_character().id, PROGRAMMING_CAT);
    }

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.get(WRITING_DOG).unwrap().name, "写作狗");
        assert!(catalog.get("unicorn").is_none());
    }

    #[test]
    fn empty_task_list_is_rejected() {
        let mut cat = programming_cat();
        cat.tasks.clear();
        let err = Catalog::new(vec![cat]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::EmptyList {
                id: PROGRAMMING_CAT.into(),
                list: "tasks"
            }
        );
    }

    #[test]
    fn blank_template_entry_is_rejected() {
        let mut dog = writing_dog();
        dog.reflection_templates.partial.push("   ".into());
        let err = Catalog::new(vec![dog]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::BlankEntry {
                id: WRITING_DOG.into(),
                list: "partial"
            }
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = Catalog::new(vec![writing_dog(), writing_dog()]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId(WRITING_DOG.into()));
    }

    #[test]
    fn reflection_text_selects_level() {
        assert_eq!(
            CompletionLevel::from_reflection("写完了"),
            CompletionLevel::Completed
        );
        assert_eq!(CompletionLevel::from_reflection("  "), CompletionLevel::Partial);
    }

    #[test]
    fn rotation_includes_encouragements() {
        let cat = programming_cat();
        let messages = cat.rotation_messages();
        assert_eq!(
            messages.len(),
            cat.progress_reports.working.len() + FOCUS_ENCOURAGEMENTS.len()
        );
        assert!(messages.contains(&"你的进度很不错呢"));
    }
}
