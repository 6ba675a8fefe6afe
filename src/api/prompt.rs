//! Prompt templates for the relay tasks.
//!
//! Each task declares the slots its template needs. Rendering checks the
//! declaration against the supplied values, so the provider never receives
//! a prompt with a hole in it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Slot values keyed by slot name.
pub type Slots = BTreeMap<&'static str, String>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("required prompt slot '{0}' is empty")]
    MissingSlot(&'static str),

    #[error("template references undeclared slot '{0}'")]
    UndeclaredSlot(String),
}

/// The relay tasks, one per endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelayTask {
    Suggest,
    Scholar,
    Literature,
    PreProposal,
    Summarize,
    Evaluate,
    TranslateTopic,
    GeneralTranslate,
    ChatBot,
}

impl RelayTask {
    pub const ALL: [RelayTask; 9] = [
        Self::Suggest,
        Self::Scholar,
        Self::Literature,
        Self::PreProposal,
        Self::Summarize,
        Self::Evaluate,
        Self::TranslateTopic,
        Self::GeneralTranslate,
        Self::ChatBot,
    ];

    /// Route path, relative to the server root.
    pub fn path(self) -> &'static str {
        match self {
            Self::Suggest => "/api/chat",
            Self::Scholar => "/api/scholar",
            Self::Literature => "/api/literature",
            Self::PreProposal => "/api/pre-proposal",
            Self::Summarize => "/api/summarize",
            Self::Evaluate => "/api/evaluate-proposal",
            Self::TranslateTopic => "/api/translate",
            Self::GeneralTranslate => "/api/general-translate",
            Self::ChatBot => "/api/chat-bot",
        }
    }

    pub fn temperature(self) -> f32 {
        match self {
            Self::Suggest => 0.8,
            Self::PreProposal | Self::ChatBot => 0.7,
            Self::Literature => 0.6,
            Self::Scholar | Self::Summarize => 0.5,
            Self::Evaluate => 0.4,
            Self::GeneralTranslate => 0.3,
            Self::TranslateTopic => 0.2,
        }
    }

    /// Whether the provider is asked for a JSON object.
    pub fn expects_json(self) -> bool {
        !matches!(
            self,
            Self::TranslateTopic | Self::GeneralTranslate | Self::ChatBot
        )
    }
}

/// A prompt body with `{slot}` placeholders.
#[derive(Debug)]
pub struct PromptTemplate {
    pub task: RelayTask,
    /// Slots that must be present and non-blank.
    pub required: &'static [&'static str],
    /// Slots that fall back to the paired default when absent or blank.
    pub optional: &'static [(&'static str, &'static str)],
    pub body: &'static str,
}

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").unwrap());

impl PromptTemplate {
    pub fn render(&self, slots: &Slots) -> Result<String, PromptError> {
        for name in self.required {
            match slots.get(name) {
                Some(v) if !v.trim().is_empty() => {}
                _ => return Err(PromptError::MissingSlot(name)),
            }
        }

        for caps in PLACEHOLDER_RE.captures_iter(self.body) {
            let name = &caps[1];
            if !self.required.contains(&name) && !self.optional.iter().any(|(n, _)| *n == name) {
                return Err(PromptError::UndeclaredSlot(name.to_string()));
            }
        }

        let rendered = PLACEHOLDER_RE.replace_all(self.body, |caps: &regex::Captures| {
            let name = &caps[1];
            match slots.get(name).filter(|v| !v.trim().is_empty()) {
                Some(v) => v.clone(),
                None => self
                    .optional
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, d)| d.to_string())
                    .unwrap_or_default(),
            }
        });

        Ok(rendered.trim().to_string())
    }
}

pub static TOPIC_SIMPLE: PromptTemplate = PromptTemplate {
    task: RelayTask::Suggest,
    required: &["field_of_study"],
    optional: &[],
    body: r#"
برای رشته تحصیلی "{field_of_study}"، لطفاً موارد زیر را تولید کن:
1. یک لیست از 5 تا 10 کلیدواژه تخصصی و مهم.
2. یک لیست از 3 تا 5 موضوع پیشنهادی برای پایان‌نامه که جدید و کاربردی باشند.

خروجی باید دقیقاً یک آبجکت JSON معتبر با کلیدهای "keywords" و "topics" باشد (هر دو آرایه‌ای از رشته‌ها). هیچ متن اضافی خارج از JSON ارائه نده.
"#,
};

pub static TOPIC_ADVANCED: PromptTemplate = PromptTemplate {
    task: RelayTask::Suggest,
    required: &["field_of_study"],
    optional: &[
        ("keywords", "ارائه نشده"),
        ("level", "نامشخص"),
        ("methodology", "نامشخص"),
        ("target_population", "ارائه نشده"),
        ("level_note", ""),
    ],
    body: r#"
به عنوان یک مشاور متخصص پایان‌نامه، برای رشته تحصیلی "{field_of_study}" با توجه به اطلاعات تکمیلی زیر تولید کن:
1. یک لیست از 5 تا 10 کلیدواژه تخصصی و مهم.
2. یک لیست از 3 تا 5 موضوع پیشنهادی برای پایان‌نامه که جدید، خلاقانه و قابل تحقیق باشند.

اطلاعات تکمیلی:
- کلیدواژه‌های اولیه مدنظر دانشجو: {keywords}
- مقطع تحصیلی: {level}
- روش تحقیق مورد نظر: {methodology}
- جامعه هدف: {target_population}
{level_note}

خروجی باید دقیقاً یک آبجکت JSON معتبر با کلیدهای "keywords" و "topics" باشد (هر دو آرایه‌ای از رشته‌ها). هیچ متن اضافی خارج از JSON ارائه نده.
"#,
};

pub const ARSHAD_NOTE: &str = "نکته مهم: چون مقطع کارشناسی ارشد است، موضوعات باید بیشتر ماهیت «رابطه‌ای» و کاربردی داشته باشند و از پیچیدگی بیش از حد پرهیز شود.";
pub const DOCTORA_NOTE: &str = "نکته مهم: چون مقطع دکتری است، موضوعات باید کاملاً نوآورانه، عمیق و دارای جنبه «مدل‌سازی» یا توسعه نظریه باشند.";

pub static SCHOLAR: PromptTemplate = PromptTemplate {
    task: RelayTask::Scholar,
    required: &["keywords"],
    optional: &[],
    body: r#"
You are an academic research assistant that knows real papers indexed by Google Scholar, IEEE Xplore and ScienceDirect.
Find 3 recent (last 4 years), highly relevant, REAL English-language articles for these Persian keywords: "{keywords}".

1. Translate the keywords into effective English search terms internally.
2. For each article give:
   - title: the full, correct title
   - authors: array of the main authors' names
   - publicationYear: the year as a number
   - summary: one or two sentences summarising the abstract
   - link: a direct, working URL to the article page. Never invent links.

Return only a JSON object with a single key "articles" holding the array of 3 article objects.
"#,
};

pub static LITERATURE: PromptTemplate = PromptTemplate {
    task: RelayTask::Literature,
    required: &["keywords"],
    optional: &[],
    body: r#"
You are an academic research assistant familiar with Iranian databases such as Civilica (civilica.com).
Provide 5 high-quality research articles relevant to the keywords "{keywords}".

For each article return:
1. paragraph: a Persian literature-review paragraph following this pattern:
   "نام خانوادگی (سال) در پژوهشی با عنوان «...» به بررسی ... پرداخت. از روش ... استفاده کرد و به این نتیجه رسید که ..."
   - one author: "نام خانوادگی (سال)"
   - two authors: "نام خانوادگی1 و نام خانوادگی2 (سال)"
   - more than two: "نام خانوادگی نفر اول و همکاران (سال)"
2. reference: the full APA citation, in Persian citation style for Persian articles.

Return only a JSON object: {"items": [{"paragraph": "string", "reference": "string"}]}
"#,
};

pub static PRE_PROPOSAL: PromptTemplate = PromptTemplate {
    task: RelayTask::PreProposal,
    required: &["topic"],
    optional: &[
        ("level", "نامشخص"),
        ("methodology", "نامشخص"),
        ("target_population", "ارائه نشده"),
    ],
    body: r#"
You are an expert academic advisor. Write a pre-proposal in Persian for this thesis topic.
Thesis topic: "{topic}"
Academic level: {level}
Preferred research method: {methodology}
Target population: {target_population}

1. introduction: a 250-word academic introduction without subheadings, moving from general concepts to the specific problem.
2. mainObjective: one main objective. specificObjectives: four specific objectives derived from it.
3. mainQuestion: one main question matching the main objective. specificQuestions: four questions matching the four specific objectives one to one.
4. methodology: researchTypeAndDesign, populationAndSample, dataCollectionTools, dataAnalysisMethod, potentialSoftware.

Return only this JSON object, with no Markdown fences:
{
  "introduction": "string",
  "mainObjective": "string",
  "specificObjectives": ["string", "string", "string", "string"],
  "mainQuestion": "string",
  "specificQuestions": ["string", "string", "string", "string"],
  "methodology": {
    "researchTypeAndDesign": "string",
    "populationAndSample": "string",
    "dataCollectionTools": "string",
    "dataAnalysisMethod": "string",
    "potentialSoftware": "string"
  }
}
"#,
};

pub static SUMMARIZE: PromptTemplate = PromptTemplate {
    task: RelayTask::Summarize,
    required: &["content"],
    optional: &[],
    body: r#"
You are an expert academic researcher. Analyse the article text below and write a structured Persian summary of about 500 words in total.

## Article text
"""
{content}
"""

Extract, in Persian:
1. title: the article title
2. introduction: the research problem and its significance
3. researchMethod: the overall methodology
4. dataCollectionMethod: how data was collected
5. statisticalPopulation: the population and sample
6. dataAnalysisMethod: how data was analysed
7. results: the main findings and conclusions

Return only a JSON object with exactly these string keys:
{"title": "", "introduction": "", "researchMethod": "", "dataCollectionMethod": "", "statisticalPopulation": "", "dataAnalysisMethod": "", "results": ""}
"#,
};

pub static EVALUATE: PromptTemplate = PromptTemplate {
    task: RelayTask::Evaluate,
    required: &["sections"],
    optional: &[],
    body: r#"
You are a strict, expert professor and thesis supervisor evaluating a research proposal.
The student may have submitted only some sections. Evaluate ONLY the sections provided and never list a missing section as a weakness.

## Submitted sections
{sections}

1. If related sections are present (for example objectives and questions), check that they align.
2. Judge the academic tone and scientific validity of the submitted text.
3. Identify concrete weaknesses in the submitted text.
4. Suggest concrete scientific improvements.
5. Give a score from 1 to 100 for the submitted content.

Answer in Persian as a single JSON object with 3 to 6 points:
{"score": 0, "overallComment": "string", "points": [{"weakness": "string", "improvement": "string"}]}
"#,
};

pub static TRANSLATE_TOPIC: PromptTemplate = PromptTemplate {
    task: RelayTask::TranslateTopic,
    required: &["text"],
    optional: &[],
    body: r#"
Translate the following academic thesis topic from Persian to English.
Return ONLY the English text, without labels, quotation marks or explanations.
Persian text: "{text}"
"#,
};

pub static GENERAL_TRANSLATE: PromptTemplate = PromptTemplate {
    task: RelayTask::GeneralTranslate,
    required: &["text", "source_language", "target_language", "tone"],
    optional: &[("extra", "")],
    body: r#"
Act as a professional bilingual translator.
Translate the following text from **{source_language}** to **{target_language}**.

Target tone: **{tone}**

Text to translate:
"{text}"

Return ONLY the translated text. Do not add any explanations. {extra}
"#,
};

pub static CHAT_BOT: PromptTemplate = PromptTemplate {
    task: RelayTask::ChatBot,
    required: &[],
    optional: &[],
    body: r#"
You are a knowledgeable, strict but helpful university professor acting as a thesis supervisor (استاد راهنما).
Guide the student on research, thesis topics, methodology and academic writing.
1. Answer in Persian (Farsi).
2. Be formal, academic and precise.
3. Do not do the student's work for them; give guidance, examples and corrections.
4. If the question is not academic, politely steer back to research and thesis topics.
"#,
};

pub fn tone_instruction(tone: super::types::TranslationTone) -> &'static str {
    use super::types::TranslationTone;
    match tone {
        TranslationTone::Formal => {
            "Official, formal and professional. Suitable for business or legal documents."
        }
        TranslationTone::Informal => {
            "Conversational, friendly and casual. Suitable for chats or blog posts."
        }
        TranslationTone::Academic => {
            "Scholarly, precise and sophisticated. Suitable for research papers or essays."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(pairs: &[(&'static str, &str)]) -> Slots {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn required_slot_must_be_non_blank() {
        let err = SCHOLAR.render(&slots(&[("keywords", "   ")])).unwrap_err();
        assert_eq!(err, PromptError::MissingSlot("keywords"));
        assert_eq!(
            SCHOLAR.render(&Slots::new()).unwrap_err(),
            PromptError::MissingSlot("keywords")
        );
    }

    #[test]
    fn optional_slots_fall_back_to_defaults() {
        let prompt = TOPIC_ADVANCED
            .render(&slots(&[("field_of_study", "روانشناسی"), ("level", "دکتری")]))
            .unwrap();
        assert!(prompt.contains("\"روانشناسی\""));
        assert!(prompt.contains("مقطع تحصیلی: دکتری"));
        assert!(prompt.contains("روش تحقیق مورد نظر: نامشخص"));
        assert!(prompt.contains("کلیدواژه‌های اولیه مدنظر دانشجو: ارائه نشده"));
        assert!(!prompt.contains("{level_note}"));
    }

    #[test]
    fn json_examples_are_not_mistaken_for_slots() {
        let prompt = PRE_PROPOSAL
            .render(&slots(&[("topic", "هوش مصنوعی در آموزش")]))
            .unwrap();
        assert!(prompt.contains("\"researchTypeAndDesign\": \"string\""));
        assert!(prompt.contains("Thesis topic: \"هوش مصنوعی در آموزش\""));
    }

    #[test]
    fn undeclared_slot_is_rejected() {
        let broken = PromptTemplate {
            task: RelayTask::Scholar,
            required: &[],
            optional: &[],
            body: "hello {name}",
        };
        assert_eq!(
            broken.render(&Slots::new()).unwrap_err(),
            PromptError::UndeclaredSlot("name".to_string())
        );
    }

    #[test]
    fn every_task_has_a_distinct_path() {
        let mut paths: Vec<_> = RelayTask::ALL.iter().map(|t| t.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), RelayTask::ALL.len());
    }

    #[test]
    fn text_tasks_do_not_request_json() {
        assert!(RelayTask::Suggest.expects_json());
        assert!(!RelayTask::GeneralTranslate.expects_json());
        assert!(!RelayTask::ChatBot.expects_json());
    }
}
