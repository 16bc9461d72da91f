use shared::{Disease, Label};

pub fn recommend(disease: Disease, label: Label) -> &'static str {
    match (disease, label) {
        (Disease::Diabetes, Label::Positive) => {
            "Positive Diagnosis - At Risk:
- Maintain strict blood glucose monitoring.
- Follow a diabetes-friendly diet rich in fiber, vegetables, and lean proteins.
- Engage in regular physical activity (at least 30 minutes daily).
- Avoid sugary foods and beverages.
- Schedule regular check-ups with your healthcare provider.
- Consider medication adherence and insulin therapy if prescribed.
- Monitor for symptoms like excessive thirst, frequent urination, and fatigue.
"
        }
        (Disease::Diabetes, Label::Negative) => {
            "Negative Diagnosis - Not At Risk:
- Maintain a balanced diet and healthy lifestyle to prevent diabetes.
- Continue regular physical activity.
- Monitor blood sugar levels periodically.
- Stay informed about risk factors such as family history or weight changes.
- Schedule routine health screenings.
"
        }
        (Disease::HeartDisease, Label::Positive) => {
            "Positive Diagnosis - At Risk:
- Follow a heart-healthy diet low in saturated fats, cholesterol, and sodium.
- Control blood pressure and cholesterol levels with medication if prescribed.
- Avoid tobacco and limit alcohol consumption.
- Engage in moderate exercise as advised by your cardiologist.
- Manage stress through relaxation techniques or counseling.
- Monitor symptoms such as chest pain, shortness of breath, or palpitations.
- Regular cardiology follow-ups and diagnostic tests are recommended.
"
        }
        (Disease::HeartDisease, Label::Negative) => {
            "Negative Diagnosis - Not At Risk:
- Maintain a balanced diet and regular exercise routine.
- Avoid smoking and limit alcohol intake.
- Monitor blood pressure and cholesterol levels periodically.
- Manage stress and maintain a healthy weight.
- Schedule regular cardiovascular health check-ups.
"
        }
        (Disease::Parkinsons, Label::Positive) => {
            "Positive Diagnosis - At Risk:
- Consult a neurologist promptly for detailed assessment.
- Discuss medication options that can help manage symptoms.
- Engage in physical therapy to improve mobility and balance.
- Consider occupational therapy for daily activity support.
- Monitor symptoms progression and report any changes immediately.
- Maintain a supportive social and family environment.
"
        }
        (Disease::Parkinsons, Label::Negative) => {
            "Negative Diagnosis - Not At Risk:
- Maintain an active lifestyle with regular exercise.
- Stay mentally engaged with activities like puzzles or reading.
- Avoid exposure to toxins and harmful chemicals.
- Monitor for any new or worsening symptoms.
- Schedule routine neurological check-ups if risk factors exist.
"
        }
        (Disease::BreastCancer, Label::Positive) => {
            "Positive Diagnosis - At Risk:
- Schedule an appointment with an oncologist immediately.
- Follow through with recommended diagnostic tests (biopsy, imaging).
- Discuss treatment options including surgery, chemotherapy, or radiation.
- Maintain emotional and psychological support via counseling or support groups.
- Inform family members about genetic risk factors if applicable.
- Follow up regularly and adhere to prescribed treatment plans.
"
        }
        (Disease::BreastCancer, Label::Negative) => {
            "Negative Diagnosis - Not At Risk:
- Perform regular breast self-examinations.
- Schedule routine mammograms and screenings as per guidelines.
- Maintain a healthy diet and exercise regularly.
- Avoid known carcinogens such as tobacco and excessive alcohol.
- Stay vigilant for any changes or lumps and consult a doctor promptly.
"
        }
    }
}
