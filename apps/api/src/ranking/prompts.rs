// All LLM prompt constants for the ranking pipeline.
// Templates are filled with `llm_client::prompts::fill_template`.

pub const CRITERIA_SYSTEM: &str = "You are an expert in HR and job description analysis.";

/// Criteria extraction prompt. Placeholders: `{jd_text}`, `{json_only}`.
pub const CRITERIA_PROMPT_TEMPLATE: &str = r#"Extract the key hiring criteria from the following job description. Provide them in a JSON format.

Job Description:
{jd_text}

Output format:
{
  "criteria": [
    "Required skill 1",
    "Required skill 2",
    "Required qualification",
    "Experience in XYZ"
  ]
}

Copy each criterion as literally as the job description states it. {json_only}"#;

pub const SCORING_SYSTEM: &str = "You are an AI expert in resume evaluation and ranking.";

/// Resume scoring prompt.
/// Placeholders: `{criteria}`, `{resume_text}`, `{candidate_name}`, `{json_only}`.
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Instruction:

1. Evaluate the following resume based on the extracted 'criteria' provided. Score the candidate on a scale of 0 to 5 for each of the relevant skills and provide a total score.
2. Summarize the full extracted criteria into 3-4 key skill sets or categories that represent the most important attributes needed for the role. Make sure the summarized skill sets are concise and focused.
3. Assign a score from 0 to 5 to each skill set or category. The score should reflect how well the candidate demonstrates that skill based on the content of their resume.
4. Provide a total score by adding the scores from each skill set. The total score must be the sum of all individual skill set scores, and it must be between 0 and 20 (since each skill set score can be a maximum of 5).
5. Ensure that the score for each individual skill set does not exceed 5. If the candidate demonstrates no expertise in a particular skill, assign a score of 0.
6. Only return the response in a proper, clean, and well-structured JSON format. Do not include any additional text or commentary in the response.
7. Ensure the key "candidate_name" is included with the candidate's name, and each skill set and total score is correctly labeled and assigned.

criteria:
{criteria}

Resume Text:
{resume_text}

Provide the output in the following JSON format:
{
    "candidates": [
        {
            "candidate_name": "{candidate_name}",
            "Python_development": "score_value",
            "Machine_learning_algorithms": "score_value",
            "Cloud_and_Database": "score_value",
            "Certification": "score_value",
            "total_score": "total_value"
        }
    ]
}

{json_only}"#;
