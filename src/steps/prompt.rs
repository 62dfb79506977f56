//! Prompt template for AI task breakdown.

/// Build the breakdown prompt for a task title.
///
/// Asks for 3 to 6 small actionable steps with materials, in a strict JSON
/// shape the caller validates.
pub fn breakdown_prompt(task_title: &str) -> String {
    format!(
        r#"You are an expert in breaking down tasks for neurodivergent teens who struggle with executive function. Your goal is to make tasks feel less overwhelming and more achievable.

A user has given you a task title. Your job is to break it down into 3 to 6 small, clear, and actionable steps. For each step, also list any materials they might need.

The task is: "{title}"

Please provide your response in a JSON format. The JSON should be an object with a single key "steps", which is an array of objects. Each object in the array should have two keys:
1. "description": A string describing the step in simple, encouraging language. Start with a verb.
2. "materials": A string listing the necessary materials, or null if none are needed.

Example response for "Study for my history test":
{{
  "steps": [
    {{
      "description": "Find your history textbook and notebook.",
      "materials": "History textbook, notebook"
    }},
    {{
      "description": "Read through one chapter of your notes.",
      "materials": "Notebook, pen or highlighter"
    }},
    {{
      "description": "Try to answer 5 practice questions at the end of the chapter.",
      "materials": "Textbook, paper, pen"
    }},
    {{
      "description": "Take a 5-minute break to stretch or get a snack.",
      "materials": null
    }},
    {{
      "description": "Review the key terms from the chapter one more time.",
      "materials": "Textbook or notes"
    }}
  ]
}}

Now, generate the steps for the task: "{title}""#,
        title = task_title
    )
}
