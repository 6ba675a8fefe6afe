//! Presence checks run before any request leaves the client.

use thiserror::Error;

use super::state::ModeState;
use crate::extract::UploadedFile;
use crate::limits::{word_count, MAX_FILE_BYTES, MAX_TRANSLATE_WORDS, MIN_SUMMARY_CHARS};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("لطفاً رشته تحصیلی خود را وارد کنید.")]
    MissingFieldOfStudy,

    #[error("لطفاً کلیدواژه‌ها را وارد کنید.")]
    MissingKeywords,

    #[error("لطفاً موضوع پایان‌نامه را وارد کنید.")]
    MissingTopic,

    #[error("لطفاً یک فایل بارگذاری کنید یا متن مقاله (حداقل {} کاراکتر) را وارد کنید.", MIN_SUMMARY_CHARS)]
    MissingArticleContent,

    #[error("لطفاً حداقل یک بخش از پروپوزال را تکمیل کنید یا فایل آن را بارگذاری کنید.")]
    EmptyProposal,

    #[error("لطفاً متنی برای ترجمه وارد کنید.")]
    MissingText,

    #[error("متن ورودی نباید بیشتر از {} کلمه باشد.", MAX_TRANSLATE_WORDS)]
    TooManyWords,

    #[error("لطفاً پیام خود را بنویسید.")]
    EmptyMessage,

    #[error("نوع فایل پشتیبانی نمی‌شود. لطفاً فایل PDF، Word یا متنی بارگذاری کنید.")]
    UnsupportedFileType,

    #[error("حجم فایل نباید بیشتر از ۴ مگابایت باشد.")]
    FileTooLarge,

    #[error("این بخش درخواستی برای ارسال ندارد.")]
    NothingToSubmit,

    #[error("این بخش فایل نمی‌پذیرد.")]
    FileNotAccepted,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn validate_file(file: &UploadedFile) -> Result<(), ValidationError> {
    if !file.is_supported() {
        return Err(ValidationError::UnsupportedFileType);
    }
    if file.size() > MAX_FILE_BYTES {
        return Err(ValidationError::FileTooLarge);
    }
    Ok(())
}

/// Check that the active mode has what its relay endpoint requires.
pub fn validate(state: &ModeState) -> Result<(), ValidationError> {
    match state {
        ModeState::Home | ModeState::Contact => Err(ValidationError::NothingToSubmit),
        ModeState::Topic(f) if blank(&f.input.field_of_study) => {
            Err(ValidationError::MissingFieldOfStudy)
        }
        ModeState::Article(f) if blank(&f.input.keywords) => Err(ValidationError::MissingKeywords),
        ModeState::Literature(f) if blank(&f.input.keywords) => {
            Err(ValidationError::MissingKeywords)
        }
        ModeState::PreProposal(f) if blank(&f.input.topic) => Err(ValidationError::MissingTopic),
        ModeState::Summarize(f) => match &f.input.file {
            Some(file) => validate_file(file),
            None if f.input.content.trim().chars().count() >= MIN_SUMMARY_CHARS => Ok(()),
            None => Err(ValidationError::MissingArticleContent),
        },
        ModeState::Evaluate(f) => match &f.input.file {
            Some(file) => validate_file(file),
            None if f.input.sections().iter().any(|s| !blank(s)) => Ok(()),
            None => Err(ValidationError::EmptyProposal),
        },
        ModeState::Translate(f) => {
            if blank(&f.input.text) {
                Err(ValidationError::MissingText)
            } else if word_count(&f.input.text) > MAX_TRANSLATE_WORDS {
                Err(ValidationError::TooManyWords)
            } else {
                Ok(())
            }
        }
        ModeState::Chat(c) if blank(&c.draft) => Err(ValidationError::EmptyMessage),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::state::{Form, TaskMode, TranslateInput};

    #[test]
    fn fresh_modes_fail_validation() {
        for mode in TaskMode::ALL {
            assert!(validate(&ModeState::fresh(mode)).is_err(), "{:?}", mode);
        }
    }

    #[test]
    fn one_proposal_section_is_enough() {
        let mut state = ModeState::fresh(TaskMode::Evaluate);
        if let ModeState::Evaluate(f) = &mut state {
            f.input.questions = "آیا ...؟".to_string();
        }
        assert_eq!(validate(&state), Ok(()));
    }

    #[test]
    fn translation_word_limit() {
        let state = |words: usize| {
            ModeState::Translate(Form {
                input: TranslateInput {
                    text: vec!["word"; words].join(" "),
                    ..Default::default()
                },
                result: None,
            })
        };
        assert_eq!(validate(&state(500)), Ok(()));
        assert_eq!(validate(&state(501)), Err(ValidationError::TooManyWords));
    }

    #[test]
    fn file_checks_type_then_size() {
        let image = UploadedFile::new("x.png", "image/png", vec![0; 10]);
        assert_eq!(validate_file(&image), Err(ValidationError::UnsupportedFileType));

        let big = UploadedFile::new("x.pdf", "application/pdf", vec![0; MAX_FILE_BYTES + 1]);
        assert_eq!(validate_file(&big), Err(ValidationError::FileTooLarge));

        let ok = UploadedFile::new("x.txt", "text/plain", vec![b'a'; MAX_FILE_BYTES]);
        assert_eq!(validate_file(&ok), Ok(()));
    }

    #[test]
    fn short_pasted_article_is_rejected() {
        let mut state = ModeState::fresh(TaskMode::Summarize);
        if let ModeState::Summarize(f) = &mut state {
            f.input.content = "کوتاه".to_string();
        }
        assert_eq!(validate(&state), Err(ValidationError::MissingArticleContent));
    }
}
