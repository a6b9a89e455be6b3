//! Case prompt construction.
//!
//! The wording is opaque to the pipeline; the loop only sees the returned
//! string. The exemplar payload shows the model the exact field names and
//! structure the validator requires.

/// Exemplar case payload, shown to the model as the required output shape.
const EXAMPLE_CASE: &str = r#"{
  "Presenting complaint": "Headache",
  "case": {
    "OSCE_Examination": {
      "Patient_Actor": {
        "Demographics": "32-year-old male",
        "History": "The patient reports a progressive worsening of headaches over the past several weeks. He also notices blurred vision occasionally, especially later in the day. He initially attributed these to work-related stress but has decided to seek medical attention as the symptoms persisted and have not responded to over-the-counter medications.",
        "Symptoms": {
          "Primary_Symptom": "Headaches",
          "Secondary_Symptoms": [
            "Blurred vision",
            "Pain intensifying over the day",
            "Occasional nausea"
          ]
        },
        "Past_Medical_History": "Previous concussion during a motor vehicle accident 5 years ago. No other significant past medical or surgical history.",
        "Social_History": "Non-smoker, occasional drinker. Works as a software engineer.",
        "Review_of_Systems": "Pain is located in the frontal region and worse in the morning. Denies fever, focal neurology, seizures, balance problems, weakness or loss of consciousness. No preceding aura."
      },
      "Physical_Examination_Findings": {
        "Vital_Signs": {
          "Temperature": "36.7°C (98°F)",
          "Blood_Pressure": "128/75 mmHg",
          "Heart_Rate": "60 bpm",
          "Respiratory_Rate": "18 breaths/min"
        },
        "Neurological_Examination": {
          "Pupils": "Bilateral papilledema",
          "Gait": "Normal gait",
          "Motor_System": "Normal power and tone in all four limbs. Deep tendon reflexes within normal limits.",
          "Sensory_System": "Normal sensation to touch, pain, temperature, and vibration."
        }
      },
      "Test_Results": {
        "Imaging": {
          "MRI_Brain": {
            "Findings": "Normal, no space-occupying lesions."
          },
          "CT_Angiogram_Brain": {
            "Findings": "Normal, no acute intracranial hemorrhage."
          }
        },
        "CSF_Opening_Pressure": "Increased CSF opening pressure",
        "CSF_analysis": {
          "Protein_Level": "Normal",
          "WBC_Count": "Normal"
        }
      },
      "Correct_Diagnosis": "Idiopathic intracranial hypertension"
    }
  }
}"#;

/// Build the generation prompt for one (complaint, diagnosis) work item.
pub fn build_case_prompt(complaint: &str, diagnosis: &str) -> String {
    format!(
        r#"You are a clinical assistant generating synthetic training data of medical cases. Your output will be parsed as JSON, so valid JSON formatting is critical.

TASK: Create a detailed medical case about {diagnosis} for a {complaint} complaint.

Include pertinent positive AND negative findings in:
- History (e.g. denies urinary symptoms, no past abdominal surgery)
- Examination (e.g. no focal neurology, no hepatosplenomegaly)
- Investigations (e.g. normal ECG, negative troponin, normal lipase)

EXTREMELY IMPORTANT INSTRUCTIONS:
1. Return ONLY a valid JSON object, nothing else.
2. Do NOT include ```json or ``` tags around your output.
3. Make sure all strings are enclosed in double quotes, not single quotes.
4. Do NOT add any comments or extra text before or after the JSON.
5. Ensure EVERY string is properly closed with a matching quote.
6. Make sure your JSON is valid and can be parsed by standard JSON parsers.
7. Use the EXACT field names shown in the example below.

These findings should help narrow the differential diagnosis by ruling out common or dangerous alternatives. All investigations ordered should be relevant to the presenting complaint and help confirm the diagnosis of {diagnosis}, or rule out other differentials.

For this case, create a realistic presentation with an adequate amount of medical uncertainty that would lead to a diagnosis of {diagnosis}.

Refrain from including pathognomonic signs of diseases in the case. Refrain from creating history and exam findings that are too obvious. ESPECIALLY in the history, make it less obvious: make the symptoms of the correct diagnosis less classical and reduce the number of typical symptoms and signs.

Make the diagnostic process difficult. Difficulty can be increased in the form of red herrings, findings or investigations that don't fit typically into the case, less typical symptoms or signs, and subtle or absent signs.

Please generate a detailed and realistic OSCE-style medical case that focuses on {diagnosis} as the correct diagnosis. Return only valid JSON, with no explanation text before or after the JSON object. Use the EXACT field names and EXACT structure shown below, and provide the diagnosis only at the end of the case.

Example format:
{EXAMPLE_CASE}
"#
    )
}
