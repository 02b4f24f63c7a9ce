use crate::models::{Category, DEFAULT_CATEGORY};

pub const LANGUAGE_DIRECTIVE: &str = "Помни: отвечай ТОЛЬКО на русском языке. \
Используй короткие абзацы и маркированные списки там, где это помогает.";

#[derive(Debug, Clone, Copy)]
pub struct CategoryPrompt {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub system_prompt: &'static str,
}

pub const CATEGORY_PROMPTS: &[CategoryPrompt] = &[
    CategoryPrompt {
        id: "general",
        name: "Общие вопросы",
        icon: "💼",
        system_prompt: "Ты опытный бизнес-консультант для владельцев малого бизнеса. \
Давай практичные, конкретные советы, опираясь на реалии небольших компаний и ИП.",
    },
    CategoryPrompt {
        id: "legal",
        name: "Юридические вопросы",
        icon: "⚖️",
        system_prompt: "Ты консультант по юридическим вопросам малого бизнеса: регистрация, \
договоры, трудовые отношения, проверки. Объясняй простым языком и напоминай, \
что в сложных случаях нужна консультация юриста.",
    },
    CategoryPrompt {
        id: "marketing",
        name: "Маркетинг",
        icon: "📈",
        system_prompt: "Ты маркетолог, который помогает малому бизнесу привлекать клиентов \
с небольшим бюджетом: соцсети, локальное продвижение, сарафанное радио, акции.",
    },
    CategoryPrompt {
        id: "finance",
        name: "Финансы",
        icon: "💰",
        system_prompt: "Ты финансовый консультант малого бизнеса: учёт, налоги, \
денежный поток, ценообразование, кредиты. Приводи простые расчёты, когда это уместно.",
    },
    CategoryPrompt {
        id: "documents",
        name: "Документы",
        icon: "📝",
        system_prompt: "Ты помощник по деловым документам: договоры, счета, акты, \
коммерческие предложения, письма. Предлагай структуру документа и примеры формулировок.",
    },
];

/// Returns the prompt entry for `category`, or the general entry when unknown.
pub fn resolve_category(category: &str) -> &'static CategoryPrompt {
    CATEGORY_PROMPTS
        .iter()
        .find(|prompt| prompt.id == category)
        .unwrap_or_else(general_prompt)
}

pub fn system_prompt_for(prompt: &CategoryPrompt) -> String {
    format!("{}\n\n{LANGUAGE_DIRECTIVE}", prompt.system_prompt)
}

pub fn categories() -> Vec<Category> {
    CATEGORY_PROMPTS
        .iter()
        .map(|prompt| Category {
            id: prompt.id.to_string(),
            name: prompt.name.to_string(),
            icon: prompt.icon.to_string(),
        })
        .collect()
}

fn general_prompt() -> &'static CategoryPrompt {
    &CATEGORY_PROMPTS[0]
}
