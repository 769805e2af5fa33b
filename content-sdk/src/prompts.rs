//! Prompt builders for each capability

use crate::capability::Tone;

pub fn script_prompt(topic: &str, tone: Tone) -> String {
    format!(
        "You are a professional podcast script writer. Create an engaging podcast script about the following topic.

Topic: {topic}
Tone: {tone}
Style Instructions: {instructions}

Requirements:
- Start with an attention-grabbing introduction hook
- Cover 3-4 key points or segments related to the topic
- Include natural transitions between segments
- Add relevant examples, anecdotes, or data where appropriate
- End with a memorable conclusion and call-to-action
- Make it suitable for audio format (conversational, easy to follow)
- Length: 800-1200 words

Format the script with clear sections and speaker cues where appropriate. Write it as if it will be read aloud.",
        topic = topic.trim(),
        tone = tone,
        instructions = tone.instructions(),
    )
}

pub fn summary_prompt(script: &str) -> String {
    format!(
        "Please provide a concise summary of the following podcast script. The summary should:
- Be 2-3 paragraphs long (150-200 words)
- Capture the main topic and key points discussed
- Highlight the most important takeaways
- Be written in a clear, engaging style

Podcast Script:
{script}

Summary:"
    )
}

pub fn quiz_prompt(script: &str) -> String {
    format!(
        "Based on the following podcast script, create a multiple-choice quiz with 3-5 questions to test comprehension.

Requirements:
- Each question should have exactly 4 options
- Questions should test understanding of key concepts, not trivial details
- Include one clearly correct answer per question
- correctAnswer is the 0-based index (0-3) of the correct option
- Return ONLY a valid JSON array, with no other text

Format:
[
  {{
    \"question\": \"Question text?\",
    \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"],
    \"correctAnswer\": 0
  }}
]

Podcast Script:
{script}"
    )
}
